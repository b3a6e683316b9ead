//! Tokens and the document iterator seam.
//!
//! A document is seen by the index only as a flat stream of tokens: object
//! keys, object values and array elements, with nested containers entered
//! transparently. Anything that can produce that stream implements
//! [`TokenSource`]; `serde_json::Value` is supported out of the box.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::error::Result;
use crate::hash::HashMethod;
use crate::numeric::{canonical_bytes, json_numeric};

/// Where a scalar appeared in its document.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Role {
    Key,
    Value,
    Element,
}

impl Role {
    /// Byte prepended to every hashed token so that equal content under
    /// different roles lands on different bits.
    pub const fn tag(self) -> u8 {
        match self {
            Role::Key => b'K',
            Role::Value => b'V',
            Role::Element => b'E',
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Scalar<'a> {
    Null,
    Bool(bool),
    Numeric(BigDecimal),
    String(&'a str),
}

const TYPE_BOOL: &[u8] = b"b";
const TYPE_NUMERIC: &[u8] = b"n";
const TYPE_STRING: &[u8] = b"s";

impl Scalar<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    fn position(&self, role: Role, method: HashMethod) -> Option<usize> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(b) => {
                let payload: &[u8] = if *b { b"t" } else { b"f" };
                Some(method.position(role, &[TYPE_BOOL, payload]))
            }
            Scalar::Numeric(n) => {
                let payload = canonical_bytes(n);
                Some(method.position(role, &[TYPE_NUMERIC, payload.as_slice()]))
            }
            Scalar::String(s) => Some(method.position(role, &[TYPE_STRING, s.as_bytes()])),
        }
    }
}

/// One unit of a document's flattened token stream.
#[derive(Clone, PartialEq, Debug)]
pub enum Token<'a> {
    Key(&'a str),
    Value(Scalar<'a>),
    Element(Scalar<'a>),
}

impl<'a> Token<'a> {
    pub fn role(&self) -> Role {
        match self {
            Token::Key(_) => Role::Key,
            Token::Value(_) => Role::Value,
            Token::Element(_) => Role::Element,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Token::Key(_) => false,
            Token::Value(s) | Token::Element(s) => s.is_null(),
        }
    }

    /// Signature bit for this token, or `None` for nulls, which never
    /// contribute a bit.
    pub fn position(&self, method: HashMethod) -> Option<usize> {
        match self {
            Token::Key(key) => Some(method.key_position(key)),
            Token::Value(s) => s.position(Role::Value, method),
            Token::Element(s) => s.position(Role::Element, method),
        }
    }

    fn reborrow(&self) -> Token<'_> {
        self.clone()
    }
}

/// The document iterator contract: a finite, restartable stream of tokens.
pub trait TokenSource {
    fn tokens(&self) -> impl Iterator<Item = Token<'_>>;
}

impl<'a> TokenSource for [Token<'a>] {
    fn tokens(&self) -> impl Iterator<Item = Token<'_>> {
        self.iter().map(Token::reborrow)
    }
}

impl<'a> TokenSource for Vec<Token<'a>> {
    fn tokens(&self) -> impl Iterator<Item = Token<'_>> {
        self.as_slice().tokens()
    }
}

impl TokenSource for Value {
    fn tokens(&self) -> impl Iterator<Item = Token<'_>> {
        JsonTokens::new(self)
    }
}

/// Parses JSON text into a document.
pub fn parse_document(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

fn scalar(value: &Value) -> Option<Scalar<'_>> {
    match value {
        Value::Null => Some(Scalar::Null),
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Number(n) => Some(Scalar::Numeric(json_numeric(n))),
        Value::String(s) => Some(Scalar::String(s)),
        Value::Array(_) | Value::Object(_) => None,
    }
}

enum Frame<'a> {
    /// A top-level document not yet looked at.
    Root(&'a Value),
    /// An object member whose key was just emitted.
    Member(&'a Value),
    Object(serde_json::map::Iter<'a>),
    Array(std::slice::Iter<'a, Value>),
}

impl<'a> Frame<'a> {
    fn container(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Frame::Object(map.iter())),
            Value::Array(items) => Some(Frame::Array(items.iter())),
            _ => None,
        }
    }
}

/// Depth-first token iterator over a JSON document.
///
/// A top-level scalar is reported as a single array element; empty containers
/// produce no tokens at all.
pub struct JsonTokens<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> JsonTokens<'a> {
    pub fn new(doc: &'a Value) -> Self {
        Self {
            stack: vec![Frame::Root(doc)],
        }
    }

    fn enter(&mut self, value: &'a Value) {
        if let Some(frame) = Frame::container(value) {
            self.stack.push(frame);
        }
    }
}

impl<'a> Iterator for JsonTokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.last_mut()? {
                Frame::Root(doc) => {
                    let doc = *doc;
                    self.stack.pop();
                    match scalar(doc) {
                        Some(s) => return Some(Token::Element(s)),
                        None => self.enter(doc),
                    }
                }
                Frame::Member(value) => {
                    let value = *value;
                    self.stack.pop();
                    match scalar(value) {
                        Some(s) => return Some(Token::Value(s)),
                        None => self.enter(value),
                    }
                }
                Frame::Object(members) => match members.next() {
                    Some((key, value)) => {
                        self.stack.push(Frame::Member(value));
                        return Some(Token::Key(key));
                    }
                    None => {
                        self.stack.pop();
                    }
                },
                Frame::Array(items) => match items.next() {
                    Some(item) => match scalar(item) {
                        Some(s) => return Some(Token::Element(s)),
                        None => self.enter(item),
                    },
                    None => {
                        self.stack.pop();
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    fn num(text: &str) -> Scalar<'static> {
        Scalar::Numeric(crate::numeric::parse_numeric(text).unwrap())
    }

    #[test]
    fn test_object_tokens() {
        let doc = json!({"a": 1, "b": "x"});
        let tokens: Vec<Token> = doc.tokens().collect();
        assert_eq!(
            tokens,
            vec![
                Token::Key("a"),
                Token::Value(num("1")),
                Token::Key("b"),
                Token::Value(Scalar::String("x")),
            ]
        );
    }

    #[test]
    fn test_nested_tokens() {
        let doc = json!({"a": {"b": [true, null, [2]]}, "c": []});
        let tokens: Vec<Token> = doc.tokens().collect();
        assert_eq!(
            tokens,
            vec![
                Token::Key("a"),
                Token::Key("b"),
                Token::Element(Scalar::Bool(true)),
                Token::Element(Scalar::Null),
                Token::Element(num("2")),
                Token::Key("c"),
            ]
        );
    }

    #[rstest]
    #[case(json!("s"), Token::Element(Scalar::String("s")))]
    #[case(json!(false), Token::Element(Scalar::Bool(false)))]
    #[case(json!(null), Token::Element(Scalar::Null))]
    fn test_top_level_scalar_is_element(#[case] doc: Value, #[case] expected: Token<'static>) {
        let tokens: Vec<Token> = doc.tokens().collect();
        assert_eq!(tokens, vec![expected]);
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!([]))]
    #[case(json!([[], {}]))]
    fn test_empty_containers_have_no_tokens(#[case] doc: Value) {
        assert_eq!(doc.tokens().count(), 0);
    }

    #[test]
    fn test_tokens_restart() {
        let doc = json!([1, 2, 3]);
        assert_eq!(doc.tokens().count(), 3);
        assert_eq!(doc.tokens().count(), 3);
    }

    #[test]
    fn test_token_slice_source() {
        let tokens = vec![Token::Key("k"), Token::Element(Scalar::Bool(true))];
        let again: Vec<Token> = tokens.tokens().collect();
        assert_eq!(again, tokens);
        assert_eq!(tokens.as_slice().tokens().count(), 2);
    }

    #[rstest]
    #[case(HashMethod::Crc32)]
    #[case(HashMethod::SipHash)]
    #[case(HashMethod::XXHash)]
    fn test_token_encodings(#[case] method: HashMethod) {
        let key = Token::Key("a").position(method);
        assert_eq!(key, Some(method.position(Role::Key, &["a".as_bytes()])));

        let value = Token::Value(Scalar::String("a")).position(method);
        assert_eq!(value, Some(method.position(Role::Value, &["s".as_bytes(), "a".as_bytes()])));

        let element = Token::Element(Scalar::Bool(true)).position(method);
        assert_eq!(element, Some(method.position(Role::Element, &["b".as_bytes(), "t".as_bytes()])));
    }

    #[test]
    fn test_string_and_bool_do_not_share_encoding() {
        // "t" as a string and true as a boolean carry different type tags
        let method = HashMethod::Crc32;
        assert_ne!(
            method.hash_parts(Role::Value, &["s".as_bytes(), "t".as_bytes()]),
            method.hash_parts(Role::Value, &["b".as_bytes(), "t".as_bytes()])
        );
    }

    #[test]
    fn test_numeric_tokens_hash_by_value() {
        let method = HashMethod::default();
        let a = Token::Value(num("1")).position(method);
        let b = Token::Value(num("1.0")).position(method);
        assert_eq!(a, b);
    }

    #[test]
    fn test_null_has_no_position() {
        assert_eq!(Token::Value(Scalar::Null).position(HashMethod::default()), None);
        assert!(Token::Element(Scalar::Null).is_null());
        assert!(!Token::Key("null").is_null());
    }

    #[test]
    fn test_parse_document() {
        let doc = parse_document(r#"{"k": [1, "two"]}"#).unwrap();
        assert_eq!(doc, json!({"k": [1, "two"]}));
        assert!(matches!(parse_document("{"), Err(crate::Error::Json(_))));
    }
}
