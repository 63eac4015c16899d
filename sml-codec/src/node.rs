//! SML node tree and its type-length-value decoder
//!
//! Every node starts with a type-length byte. The high nibble is the type,
//! the low nibble the length:
//!
//! - `0x7N`: list of `N` nodes that follow directly
//! - `0x8N LL`: element whose total length (both header bytes included) is `(N << 4) + LL`
//! - anything else: element of `N` bytes including the header, `N == 0` meaning 1

use sml_core::{SmlError, SmlResult};

/// Lists nested deeper than this are rejected
pub const MAX_NESTING_DEPTH: usize = 64;

const TYPE_LIST: u8 = 0x07;
const TYPE_EXTENDED_LENGTH: u8 = 0x08;

/// A decoded SML node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Terminal value; `bytes` starts with the type-length header
    Element { bytes: Vec<u8> },
    /// Ordered children, exactly as many as the list header declared
    List { items: Vec<Node> },
}

impl Node {
    pub fn element(bytes: impl Into<Vec<u8>>) -> Self {
        Node::Element {
            bytes: bytes.into(),
        }
    }

    pub fn list(items: Vec<Node>) -> Self {
        Node::List { items }
    }

    /// Raw bytes if this is an element
    pub fn as_element(&self) -> Option<&[u8]> {
        match self {
            Node::Element { bytes } => Some(bytes),
            Node::List { .. } => None,
        }
    }

    /// Children if this is a list
    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List { items } => Some(items),
            Node::Element { .. } => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Node::List { .. })
    }
}

/// Recursive decoder over one package
///
/// The read position is passed into and returned from every call instead
/// of being kept in the decoder.
pub struct NodeDecoder<'a> {
    buffer: &'a [u8],
}

impl<'a> NodeDecoder<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer }
    }

    /// Decode top-level nodes until the buffer is exhausted
    pub fn decode_all(&self) -> SmlResult<Vec<Node>> {
        let mut nodes = Vec::new();
        let mut position = 0;
        while position < self.buffer.len() {
            let (node, next) = self.decode_node(position, 0)?;
            nodes.push(node);
            position = next;
        }
        Ok(nodes)
    }

    /// Decode the node starting at `position`, returning it with the position after it
    pub fn decode_node(&self, position: usize, depth: usize) -> SmlResult<(Node, usize)> {
        let header = *self.buffer.get(position).ok_or_else(|| {
            SmlError::LengthMismatch(format!("No node header at offset {}", position))
        })?;
        let length = (header & 0x0F) as usize;

        match header >> 4 {
            TYPE_LIST => self.decode_list(position + 1, length, depth + 1),
            TYPE_EXTENDED_LENGTH => {
                let next = *self.buffer.get(position + 1).ok_or_else(|| {
                    SmlError::LengthMismatch(format!(
                        "Extended length header at offset {} is missing its second byte",
                        position
                    ))
                })?;
                let total = (length << 4) + next as usize;
                if total < 2 {
                    return Err(SmlError::LengthMismatch(format!(
                        "Extended element at offset {} declares {} bytes, shorter than its header",
                        position, total
                    )));
                }
                self.take_element(position, total)
            }
            _ => self.take_element(position, length.max(1)),
        }
    }

    fn decode_list(&self, mut position: usize, arity: usize, depth: usize) -> SmlResult<(Node, usize)> {
        if depth > MAX_NESTING_DEPTH {
            return Err(SmlError::StructuralViolation(format!(
                "Lists nested deeper than {} levels",
                MAX_NESTING_DEPTH
            )));
        }

        let mut items = Vec::with_capacity(arity);
        while items.len() < arity {
            if position >= self.buffer.len() {
                return Err(SmlError::LengthMismatch(format!(
                    "Number of items in list ({}) does not match the declared length ({})",
                    items.len(),
                    arity
                )));
            }
            let (node, next) = self.decode_node(position, depth)?;
            items.push(node);
            position = next;
        }
        Ok((Node::List { items }, position))
    }

    fn take_element(&self, position: usize, length: usize) -> SmlResult<(Node, usize)> {
        let end = position + length;
        let bytes = self.buffer.get(position..end).ok_or_else(|| {
            SmlError::LengthMismatch(format!(
                "Element at offset {} needs {} bytes, only {} left",
                position,
                length,
                self.buffer.len() - position
            ))
        })?;
        Ok((Node::element(bytes), end))
    }
}

/// Decode a whole package into its top-level nodes
pub fn decode(package: &[u8]) -> SmlResult<Vec<Node>> {
    NodeDecoder::new(package).decode_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_element() {
        assert_eq!(decode(&[0x01]).unwrap(), vec![Node::element([0x01])]);
    }

    #[test]
    fn test_two_single_byte_elements() {
        assert_eq!(
            decode(&[0x01, 0x01]).unwrap(),
            vec![Node::element([0x01]), Node::element([0x01])]
        );
    }

    #[test]
    fn test_zero_length_nibble_is_one_byte() {
        assert_eq!(
            decode(&[0x00, 0x00]).unwrap(),
            vec![Node::element([0x00]), Node::element([0x00])]
        );
    }

    #[test]
    fn test_header_included_in_element() {
        let nodes = decode(&[0x63, 0x01, 0x01, 0x53, 0x01, 0x01, 0x01, 0x01]).unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::element([0x63, 0x01, 0x01]),
                Node::element([0x53, 0x01, 0x01]),
                Node::element([0x01]),
                Node::element([0x01]),
            ]
        );
    }

    #[test]
    fn test_five_byte_element() {
        let nodes = decode(&[0x05, 0x01, 0x02, 0x03, 0x04]).unwrap();
        assert_eq!(nodes, vec![Node::element([0x05, 0x01, 0x02, 0x03, 0x04])]);
    }

    #[test]
    fn test_element_longer_than_input() {
        let err = decode(&[0x05, 0x01, 0x02, 0x03]).unwrap_err();
        assert!(matches!(err, SmlError::LengthMismatch(_)));
    }

    #[test]
    fn test_list() {
        let nodes = decode(&[0x72, 0x01, 0x01]).unwrap();
        assert_eq!(
            nodes,
            vec![Node::list(vec![Node::element([0x01]), Node::element([0x01])])]
        );
    }

    #[test]
    fn test_nested_list() {
        let nodes = decode(&[0x72, 0x01, 0x72, 0x63, 0x01, 0x01, 0x01]).unwrap();
        assert_eq!(
            nodes,
            vec![Node::list(vec![
                Node::element([0x01]),
                Node::list(vec![Node::element([0x63, 0x01, 0x01]), Node::element([0x01])]),
            ])]
        );
    }

    #[test]
    fn test_nested_list_with_following_elements() {
        let nodes = decode(&[0x73, 0x01, 0x72, 0x63, 0x01, 0x01, 0x01, 0x02, 0x03]).unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::list(vec![
                    Node::element([0x01]),
                    Node::list(vec![Node::element([0x63, 0x01, 0x01]), Node::element([0x01])]),
                    Node::element([0x02, 0x03]),
                ]),
            ]
        );
    }

    #[test]
    fn test_list_arity_mismatch() {
        let err = decode(&[0x72, 0x01]).unwrap_err();
        assert!(matches!(err, SmlError::LengthMismatch(_)));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(
            decode(&[0x70, 0x01]).unwrap(),
            vec![Node::list(Vec::new()), Node::element([0x01])]
        );
    }

    #[test]
    fn test_extended_length_element() {
        // 0x81 0x03: total length (1 << 4) + 3 = 19 bytes
        let mut data = vec![0x81, 0x03];
        data.extend(1..=17u8);
        data.push(0x01);
        let nodes = decode(&data).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].as_element().unwrap(), &data[..19]);
        assert_eq!(nodes[1], Node::element([0x01]));
    }

    #[test]
    fn test_extended_length_errors() {
        assert!(matches!(decode(&[0x81]).unwrap_err(), SmlError::LengthMismatch(_)));
        assert!(matches!(decode(&[0x80, 0x01]).unwrap_err(), SmlError::LengthMismatch(_)));
        assert!(matches!(decode(&[0x81, 0x03, 0x00]).unwrap_err(), SmlError::LengthMismatch(_)));
    }

    #[test]
    fn test_nesting_depth_limit() {
        let data = vec![0x71; MAX_NESTING_DEPTH + 1];
        let err = decode(&data).unwrap_err();
        assert!(matches!(err, SmlError::StructuralViolation(_)));
    }
}
