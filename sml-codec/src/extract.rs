//! Mapping of a decoded SML tree onto a [`Reading`]
//!
//! The value list is located by position:
//!
//! ```text
//! root[1]                         second message (list, >= 4 items)
//!   [3]                           message body (list)
//!     the single list item        data response
//!       first list item
//!         second list item        value records
//!           record[0]             OBIS identifier element
//!           record[5]             value element
//! ```

use crate::node::Node;
use crate::scalar::{decode_hex_string, decode_integer};
use sml_core::{ObisCode, Reading, SmlError, SmlResult};

/// Divisor applied to energy counters (0.1 Wh resolution to kWh)
pub const ENERGY_DIVISOR: f64 = 10_000.0;

/// Divisor applied to instantaneous power (W)
pub const POWER_DIVISOR: f64 = 1.0;

/// Reading field an OBIS code is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingField {
    ManufacturerId,
    DeviceId,
    ConsumptionEnergyTotal,
    ConsumptionEnergyTariff1,
    ConsumptionEnergyTariff2,
    FeedEnergyTotal,
    FeedEnergyTariff1,
    FeedEnergyTariff2,
    Power,
}

impl ReadingField {
    /// Divisor for numeric fields, `None` for identifiers rendered as hex
    pub fn divisor(&self) -> Option<f64> {
        match self {
            ReadingField::ManufacturerId | ReadingField::DeviceId => None,
            ReadingField::Power => Some(POWER_DIVISOR),
            _ => Some(ENERGY_DIVISOR),
        }
    }

    fn apply(&self, reading: &mut Reading, value: &[u8]) -> SmlResult<()> {
        let Some(divisor) = self.divisor() else {
            let text = Some(decode_hex_string(value));
            match self {
                ReadingField::ManufacturerId => reading.manufacturer_id = text,
                _ => reading.device_id = text,
            }
            return Ok(());
        };

        let number = Some(decode_integer(value)? as f64 / divisor);
        let slot = match self {
            ReadingField::ConsumptionEnergyTotal => &mut reading.consumption_energy_total,
            ReadingField::ConsumptionEnergyTariff1 => &mut reading.consumption_energy_tariff1,
            ReadingField::ConsumptionEnergyTariff2 => &mut reading.consumption_energy_tariff2,
            ReadingField::FeedEnergyTotal => &mut reading.feed_energy_total,
            ReadingField::FeedEnergyTariff1 => &mut reading.feed_energy_tariff1,
            ReadingField::FeedEnergyTariff2 => &mut reading.feed_energy_tariff2,
            _ => &mut reading.power,
        };
        *slot = number;
        Ok(())
    }
}

/// One entry of the OBIS lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObisBinding {
    pub code: ObisCode,
    pub field: ReadingField,
}

const fn bind(code: ObisCode, field: ReadingField) -> ObisBinding {
    ObisBinding { code, field }
}

/// Known OBIS codes in lookup order
///
/// Manufacturer and device id each have two codes; when a package carries
/// both, the later entry overwrites the earlier one.
pub const OBIS_BINDINGS: [ObisBinding; 11] = [
    bind(ObisCode::new(0x81, 0x81, 0xC7, 0x82, 0x03, 0xFF), ReadingField::ManufacturerId),
    bind(ObisCode::new(0x01, 0x00, 0x60, 0x32, 0x01, 0x01), ReadingField::ManufacturerId),
    bind(ObisCode::new(0x01, 0x00, 0x00, 0x00, 0x09, 0xFF), ReadingField::DeviceId),
    bind(ObisCode::new(0x01, 0x00, 0x60, 0x01, 0x00, 0xFF), ReadingField::DeviceId),
    bind(ObisCode::new(0x01, 0x00, 0x01, 0x08, 0x00, 0xFF), ReadingField::ConsumptionEnergyTotal),
    bind(ObisCode::new(0x01, 0x00, 0x01, 0x08, 0x01, 0xFF), ReadingField::ConsumptionEnergyTariff1),
    bind(ObisCode::new(0x01, 0x00, 0x01, 0x08, 0x02, 0xFF), ReadingField::ConsumptionEnergyTariff2),
    bind(ObisCode::new(0x01, 0x00, 0x02, 0x08, 0x00, 0xFF), ReadingField::FeedEnergyTotal),
    bind(ObisCode::new(0x01, 0x00, 0x02, 0x08, 0x01, 0xFF), ReadingField::FeedEnergyTariff1),
    bind(ObisCode::new(0x01, 0x00, 0x02, 0x08, 0x02, 0xFF), ReadingField::FeedEnergyTariff2),
    bind(ObisCode::new(0x01, 0x00, 0x10, 0x07, 0x00, 0xFF), ReadingField::Power),
];

/// Identifier and value of one value record
///
/// `value` is `None` when the record carries a list (e.g. a list-typed
/// value) in the value position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRecord<'a> {
    pub identifier: &'a [u8],
    pub value: Option<&'a [u8]>,
}

fn violation(message: impl Into<String>) -> SmlError {
    SmlError::StructuralViolation(message.into())
}

/// Locate the list of value records inside the decoded package
pub fn value_record_list(root: &[Node]) -> SmlResult<&[Node]> {
    if root.len() < 2 {
        return Err(violation(format!(
            "Expected at least 2 messages on root level, found {}",
            root.len()
        )));
    }
    let message = root[1]
        .as_list()
        .ok_or_else(|| violation("Second node on root level is not a list"))?;
    if message.len() < 4 {
        return Err(violation(format!(
            "Second message has {} items, expected at least 4",
            message.len()
        )));
    }
    let body = message[3]
        .as_list()
        .ok_or_else(|| violation("Fourth item of the second message is not a list"))?;

    let responses: Vec<&[Node]> = body.iter().filter_map(Node::as_list).collect();
    let [response] = responses.as_slice() else {
        return Err(violation(format!(
            "Expected exactly one data response list in message body, found {}",
            responses.len()
        )));
    };

    let container = response
        .iter()
        .find_map(Node::as_list)
        .ok_or_else(|| violation("Data response contains no list"))?;

    container
        .iter()
        .filter_map(Node::as_list)
        .nth(1)
        .ok_or_else(|| violation("Value record container holds fewer than 2 lists"))
}

/// Check the shape of every value record and return their identifier/value pairs
///
/// Every record must be a list of at least 6 items with an identifier
/// element. The value is only checked once a bound code selects the record.
pub fn value_records(list: &[Node]) -> SmlResult<Vec<ValueRecord<'_>>> {
    list.iter()
        .enumerate()
        .map(|(index, node)| {
            let items = node
                .as_list()
                .ok_or_else(|| violation(format!("Value record {} is not a list", index)))?;
            if items.len() < 6 {
                return Err(violation(format!(
                    "Value record {} has {} items, expected at least 6",
                    index,
                    items.len()
                )));
            }
            let identifier = items[0].as_element().ok_or_else(|| {
                violation(format!("Identifier of value record {} is not an element", index))
            })?;
            Ok(ValueRecord {
                identifier,
                value: items[5].as_element(),
            })
        })
        .collect()
}

/// Build a reading from the decoded top-level nodes of one package
///
/// Fails as a whole if the tree does not have the expected shape or a
/// bound value cannot be decoded.
pub fn extract(root: &[Node]) -> SmlResult<Reading> {
    let records = value_records(value_record_list(root)?)?;
    let mut reading = Reading::new();

    for binding in OBIS_BINDINGS.iter() {
        let identifier = binding.code.to_element_bytes();
        if let Some(record) = records.iter().find(|r| r.identifier == identifier) {
            let value = record.value.ok_or_else(|| {
                violation(format!("Value of {} is not an element", binding.code))
            })?;
            binding.field.apply(&mut reading, value).map_err(|e| match e {
                SmlError::UnsupportedScalarEncoding(msg) | SmlError::LengthMismatch(msg) => {
                    SmlError::UnsupportedScalarEncoding(format!("{} ({})", msg, binding.code))
                }
                other => other,
            })?;
        }
    }

    Ok(reading)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn e(bytes: &[u8]) -> Node {
        Node::element(bytes)
    }

    pub(crate) fn record(code: ObisCode, value: &[u8]) -> Node {
        Node::list(vec![
            e(&code.to_element_bytes()),
            e(&[0x01]),
            e(&[0x01]),
            e(&[0x62, 0x1E]),
            e(&[0x52, 0xFF]),
            e(value),
            e(&[0x01]),
        ])
    }

    /// Wrap value records in the message structure the extractor expects
    pub(crate) fn package_tree(records: Vec<Node>) -> Vec<Node> {
        let container = Node::list(vec![
            Node::list(vec![e(&[0x01])]),
            Node::list(records),
        ]);
        let response = Node::list(vec![e(&[0x01]), container, e(&[0x01])]);
        let body = Node::list(vec![e(&[0x63, 0x07, 0x01]), response]);
        let message = Node::list(vec![
            e(&[0x05, 0x00, 0x00, 0x00, 0x02]),
            e(&[0x62, 0x00]),
            e(&[0x62, 0x00]),
            body,
            e(&[0x63, 0x12, 0x34]),
            e(&[0x00]),
        ]);
        let open = Node::list(vec![e(&[0x01]), e(&[0x01])]);
        vec![open, message, e(&[0x00])]
    }

    fn code(field: ReadingField) -> ObisCode {
        OBIS_BINDINGS
            .iter()
            .find(|b| b.field == field)
            .map(|b| b.code)
            .unwrap()
    }

    #[test]
    fn test_extract_consumption_total() {
        let tree = package_tree(vec![record(
            code(ReadingField::ConsumptionEnergyTotal),
            &[0x65, 0x00, 0x00, 0x27, 0x10],
        )]);
        let reading = extract(&tree).unwrap();
        assert_eq!(reading.consumption_energy_total, Some(1.0));
        assert_eq!(reading.power, None);
        assert_eq!(reading.manufacturer_id, None);
    }

    #[test]
    fn test_extract_all_fields() {
        let tree = package_tree(vec![
            record(ObisCode::new(0x81, 0x81, 0xC7, 0x82, 0x03, 0xFF), &[0x04, 0x45, 0x4D, 0x48]),
            record(
                ObisCode::new(0x01, 0x00, 0x00, 0x00, 0x09, 0xFF),
                &[0x0B, 0x06, 0x45, 0x4D, 0x48, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06],
            ),
            record(ObisCode::new(1, 0, 1, 8, 0, 255), &[0x65, 0x00, 0x01, 0x86, 0xA0]),
            record(ObisCode::new(1, 0, 1, 8, 1, 255), &[0x65, 0x00, 0x00, 0xC3, 0x50]),
            record(ObisCode::new(1, 0, 1, 8, 2, 255), &[0x65, 0x00, 0x00, 0xC3, 0x50]),
            record(ObisCode::new(1, 0, 2, 8, 0, 255), &[0x63, 0x13, 0x88]),
            record(ObisCode::new(1, 0, 2, 8, 1, 255), &[0x62, 0x00]),
            record(ObisCode::new(1, 0, 2, 8, 2, 255), &[0x63, 0x13, 0x88]),
            record(ObisCode::new(1, 0, 16, 7, 0, 255), &[0x53, 0xFF, 0x38]),
        ]);
        let reading = extract(&tree).unwrap();

        assert_eq!(reading.manufacturer_id.as_deref(), Some("04454D48"));
        assert_eq!(reading.device_id.as_deref(), Some("0B06454D48010203040506"));
        assert_eq!(reading.consumption_energy_total, Some(10.0));
        assert_eq!(reading.consumption_energy_tariff1, Some(5.0));
        assert_eq!(reading.consumption_energy_tariff2, Some(5.0));
        assert_eq!(reading.feed_energy_total, Some(0.5));
        assert_eq!(reading.feed_energy_tariff1, Some(0.0));
        assert_eq!(reading.feed_energy_tariff2, Some(0.5));
        assert_eq!(reading.power, Some(-200.0));
    }

    #[test]
    fn test_later_identifier_code_wins() {
        let tree = package_tree(vec![
            record(ObisCode::new(1, 0, 96, 50, 1, 1), &[0x04, 0x49, 0x53, 0x4B]),
            record(ObisCode::new(0x81, 0x81, 0xC7, 0x82, 0x03, 0xFF), &[0x04, 0x45, 0x4D, 0x48]),
            record(ObisCode::new(1, 0, 0, 0, 9, 255), &[0x03, 0x01, 0x02]),
        ]);
        let reading = extract(&tree).unwrap();
        assert_eq!(reading.manufacturer_id.as_deref(), Some("0449534B"));
        assert_eq!(reading.device_id.as_deref(), Some("030102"));
    }

    #[test]
    fn test_first_matching_record_is_used() {
        let total = ObisCode::new(1, 0, 1, 8, 0, 255);
        let tree = package_tree(vec![
            record(total, &[0x62, 0x0A]),
            record(total, &[0x62, 0x14]),
        ]);
        let reading = extract(&tree).unwrap();
        assert_eq!(reading.consumption_energy_total, Some(0.001));
    }

    #[test]
    fn test_unknown_codes_leave_reading_empty() {
        let tree = package_tree(vec![record(ObisCode::new(1, 0, 32, 7, 0, 255), &[0x62, 0xE6])]);
        assert!(extract(&tree).unwrap().is_empty());
    }

    #[test]
    fn test_bad_value_encoding_fails_whole_reading() {
        let tree = package_tree(vec![
            record(ObisCode::new(1, 0, 1, 8, 0, 255), &[0x65, 0x00, 0x00, 0x27, 0x10]),
            record(ObisCode::new(1, 0, 16, 7, 0, 255), &[0x04, 0x01, 0x02, 0x03]),
        ]);
        let err = extract(&tree).unwrap_err();
        assert!(matches!(err, SmlError::UnsupportedScalarEncoding(_)));
    }

    #[test]
    fn test_list_value_in_unbound_record_is_ignored() {
        let mut list_valued = record(ObisCode::new(1, 0, 32, 7, 0, 255), &[0x01]);
        if let Node::List { items } = &mut list_valued {
            items[5] = Node::list(vec![e(&[0x62, 0x01]), e(&[0x62, 0x02])]);
        }
        let tree = package_tree(vec![
            record(ObisCode::new(1, 0, 1, 8, 0, 255), &[0x65, 0x00, 0x00, 0x27, 0x10]),
            list_valued.clone(),
        ]);
        let reading = extract(&tree).unwrap();
        assert_eq!(reading.consumption_energy_total, Some(1.0));

        // The same shape under a bound code is rejected
        if let Node::List { items } = &mut list_valued {
            items[0] = e(&ObisCode::new(1, 0, 16, 7, 0, 255).to_element_bytes());
        }
        let tree = package_tree(vec![list_valued]);
        assert!(matches!(extract(&tree).unwrap_err(), SmlError::StructuralViolation(_)));
    }

    #[test]
    fn test_energy_values_are_nearest_f64() {
        let tree = package_tree(vec![record(
            ObisCode::new(1, 0, 1, 8, 0, 255),
            &[0x65, 0x00, 0xBC, 0x61, 0x4E],
        )]);
        let reading = extract(&tree).unwrap();
        assert_eq!(reading.consumption_energy_total, Some(1234.5678));
    }

    #[test]
    fn test_structural_violations() {
        let valid = package_tree(Vec::new());
        assert!(extract(&valid).unwrap().is_empty());

        // Too few messages
        let err = extract(&valid[..1]).unwrap_err();
        assert!(matches!(err, SmlError::StructuralViolation(_)));

        // Second message is an element
        let tree = vec![valid[0].clone(), e(&[0x01])];
        assert!(matches!(extract(&tree).unwrap_err(), SmlError::StructuralViolation(_)));

        // Second message too short
        let tree = vec![valid[0].clone(), Node::list(vec![e(&[0x01]); 3])];
        assert!(matches!(extract(&tree).unwrap_err(), SmlError::StructuralViolation(_)));

        // Message body contains two lists
        let body = Node::list(vec![Node::list(Vec::new()), Node::list(Vec::new())]);
        let message = Node::list(vec![e(&[0x01]), e(&[0x01]), e(&[0x01]), body]);
        let tree = vec![valid[0].clone(), message];
        assert!(matches!(extract(&tree).unwrap_err(), SmlError::StructuralViolation(_)));

        // Value record too short
        let tree = package_tree(vec![Node::list(vec![e(&[0x01]); 5])]);
        assert!(matches!(extract(&tree).unwrap_err(), SmlError::StructuralViolation(_)));

        // Value record is not a list
        let tree = package_tree(vec![e(&[0x01])]);
        assert!(matches!(extract(&tree).unwrap_err(), SmlError::StructuralViolation(_)));
    }

    #[test]
    fn test_value_record_list_takes_second_list() {
        let tree = package_tree(vec![record(ObisCode::new(1, 0, 1, 8, 0, 255), &[0x62, 0x01])]);
        let list = value_record_list(&tree).unwrap();
        assert_eq!(list.len(), 1);
        let records = value_records(list).unwrap();
        assert_eq!(records[0].identifier, &[0x07, 1, 0, 1, 8, 0, 255]);
        assert_eq!(records[0].value, Some(&[0x62, 0x01][..]));
    }
}
