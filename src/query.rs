use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::builder::{document_bits, key_bits};
use crate::error::{Error, Result};
use crate::options::GistOptions;
use crate::signature::{Bits, Signature};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u16)]
pub enum Strategy {
    Contains = 7,
    Exists = 9,
    ExistsAny = 10,
    ExistsAll = 11,
}

impl Strategy {
    pub const fn number(self) -> u16 {
        self as u16
    }

    pub const fn name(self) -> &'static str {
        match self {
            Strategy::Contains => "CONTAINS",
            Strategy::Exists => "EXISTS",
            Strategy::ExistsAny => "EXISTS_ANY",
            Strategy::ExistsAll => "EXISTS_ALL",
        }
    }
}

impl TryFrom<u16> for Strategy {
    type Error = Error;

    fn try_from(number: u16) -> Result<Self> {
        match number {
            7 => Ok(Strategy::Contains),
            9 => Ok(Strategy::Exists),
            10 => Ok(Strategy::ExistsAny),
            11 => Ok(Strategy::ExistsAll),
            other => Err(Error::UnsupportedStrategy(other)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum QueryOperand {
    Document(Value),
    SingleKey(String),
    KeySet(Vec<String>),
}

impl QueryOperand {
    pub fn keys_skipping_nulls<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        QueryOperand::KeySet(keys.into_iter().flatten().map(Into::into).collect())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            QueryOperand::Document(_) => "document",
            QueryOperand::SingleKey(_) => "key",
            QueryOperand::KeySet(_) => "key set",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub matches: bool,
    pub recheck: bool,
}

impl Verdict {
    fn inexact(matches: bool) -> Self {
        Verdict {
            matches,
            recheck: true,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Derived {
    Bits(Bits),
    Position(usize),
}

#[derive(Clone, Debug, Default)]
pub struct QueryCache {
    state: Option<(Strategy, Derived)>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn get_or_init(
        &mut self,
        strategy: Strategy,
        operand: &QueryOperand,
        options: &GistOptions,
    ) -> Result<Derived> {
        match self.state {
            Some((cached, derived)) if cached == strategy => Ok(derived),
            Some((cached, _)) => Err(Error::CacheMismatch {
                cached: cached.name(),
                requested: strategy.name(),
            }),
            None => {
                let derived = derive(strategy, operand, options)?;
                debug!(strategy = strategy.name(), operand = operand.kind(), "query cache initialized");
                self.state = Some((strategy, derived));
                Ok(derived)
            }
        }
    }
}

fn derive(strategy: Strategy, operand: &QueryOperand, options: &GistOptions) -> Result<Derived> {
    let method = options.hash_method();
    match (strategy, operand) {
        (Strategy::Contains, QueryOperand::Document(doc)) => {
            Ok(Derived::Bits(document_bits(doc, method)))
        }
        (Strategy::Exists, QueryOperand::SingleKey(key)) => {
            Ok(Derived::Position(method.key_position(key)))
        }
        (Strategy::ExistsAny | Strategy::ExistsAll, QueryOperand::KeySet(keys)) => {
            Ok(Derived::Bits(key_bits(keys, method)))
        }
        (strategy, operand) => Err(Error::OperandMismatch {
            strategy: strategy.name(),
            operand: operand.kind(),
        }),
    }
}

/// `false` is authoritative; `true` means the document must be rechecked.
pub fn consistent(
    node: &Signature,
    strategy: Strategy,
    operand: &QueryOperand,
    cache: &mut QueryCache,
    options: &GistOptions,
) -> Result<Verdict> {
    let derived = cache.get_or_init(strategy, operand, options)?;

    let matches = match (strategy, derived) {
        _ if node.is_saturated() => true,
        (Strategy::Exists, Derived::Position(pos)) => node.test(pos),
        (Strategy::ExistsAny, Derived::Bits(query)) => node.intersects(&query),
        (Strategy::Contains | Strategy::ExistsAll, Derived::Bits(query)) => node.contains(&query),
        (strategy, _) => {
            return Err(Error::OperandMismatch {
                strategy: strategy.name(),
                operand: operand.kind(),
            })
        }
    };
    Ok(Verdict::inexact(matches))
}

#[derive(Clone, Debug)]
pub struct Query {
    strategy: Strategy,
    operand: QueryOperand,
    options: GistOptions,
    cache: QueryCache,
}

impl Query {
    pub fn new(strategy: Strategy, operand: QueryOperand, options: GistOptions) -> Result<Self> {
        let mut cache = QueryCache::new();
        cache.get_or_init(strategy, &operand, &options)?;
        Ok(Self {
            strategy,
            operand,
            options,
            cache,
        })
    }

    pub fn contains(doc: Value, options: GistOptions) -> Result<Self> {
        Self::new(Strategy::Contains, QueryOperand::Document(doc), options)
    }

    pub fn exists(key: impl Into<String>, options: GistOptions) -> Result<Self> {
        Self::new(Strategy::Exists, QueryOperand::SingleKey(key.into()), options)
    }

    pub fn exists_any<I, S>(keys: I, options: GistOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys.into_iter().map(Into::into).collect();
        Self::new(Strategy::ExistsAny, QueryOperand::KeySet(keys), options)
    }

    pub fn exists_all<I, S>(keys: I, options: GistOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys.into_iter().map(Into::into).collect();
        Self::new(Strategy::ExistsAll, QueryOperand::KeySet(keys), options)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn operand(&self) -> &QueryOperand {
        &self.operand
    }

    pub fn consistent(&mut self, node: &Signature) -> Result<Verdict> {
        consistent(node, self.strategy, &self.operand, &mut self.cache, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashMethod;
    use crate::token::parse_document;
    use rstest::*;
    use serde_json::json;

    fn leaf(doc: Value) -> Signature {
        Signature::Explicit(document_bits(&doc, HashMethod::default()))
    }

    fn eval(node: &Signature, strategy: Strategy, operand: QueryOperand) -> bool {
        let mut cache = QueryCache::new();
        consistent(node, strategy, &operand, &mut cache, &GistOptions::default())
            .unwrap()
            .matches
    }

    #[rstest]
    #[case(7, Strategy::Contains)]
    #[case(9, Strategy::Exists)]
    #[case(10, Strategy::ExistsAny)]
    #[case(11, Strategy::ExistsAll)]
    fn test_strategy_numbers(#[case] number: u16, #[case] expected: Strategy) {
        assert_eq!(Strategy::try_from(number).unwrap(), expected);
        assert_eq!(expected.number(), number);
    }

    #[rstest]
    #[case(0)]
    #[case(8)]
    #[case(12)]
    fn test_unsupported_strategy(#[case] number: u16) {
        assert!(matches!(
            Strategy::try_from(number),
            Err(Error::UnsupportedStrategy(n)) if n == number
        ));
    }

    #[test]
    fn test_exists_present_key() {
        let node = leaf(json!({"a": 1, "b": "x"}));
        assert!(eval(&node, Strategy::Exists, QueryOperand::SingleKey("a".into())));
        assert!(eval(&node, Strategy::Exists, QueryOperand::SingleKey("b".into())));
    }

    #[test]
    fn test_exists_absent_key_without_collision() {
        let method = HashMethod::default();
        let node = leaf(json!({"a": 1, "b": "x"}));
        let bits = node.bits().unwrap();
        let expected = bits.test(method.key_position("c"));
        assert_eq!(eval(&node, Strategy::Exists, QueryOperand::SingleKey("c".into())), expected);
    }

    #[test]
    fn test_empty_document_rejects_everything() {
        let node = leaf(json!({}));
        assert!(!eval(&node, Strategy::Exists, QueryOperand::SingleKey("a".into())));
        assert!(!eval(&node, Strategy::ExistsAny, QueryOperand::KeySet(vec!["a".into(), "b".into()])));
        assert!(!eval(&node, Strategy::ExistsAll, QueryOperand::KeySet(vec!["a".into()])));
        assert!(!eval(&node, Strategy::Contains, QueryOperand::Document(json!({"a": 1}))));
    }

    #[test]
    fn test_contains() {
        let node = leaf(json!({"a": 1, "b": ["x", "y"], "c": {"d": true}}));
        assert!(eval(&node, Strategy::Contains, QueryOperand::Document(json!({"a": 1}))));
        assert!(eval(&node, Strategy::Contains, QueryOperand::Document(json!({"b": ["y"]}))));
        assert!(eval(&node, Strategy::Contains, QueryOperand::Document(json!({"c": {"d": true}}))));
        assert!(eval(&node, Strategy::Contains, QueryOperand::Document(json!({"a": 1.0}))));
        // the empty document is contained in everything
        assert!(eval(&node, Strategy::Contains, QueryOperand::Document(json!({}))));
    }

    #[rstest]
    #[case(r#"{"n": 9007199254740993}"#, r#"{"n": 9007199254740993.0}"#)]
    #[case(r#"{"n": 18446744073709551617}"#, r#"{"n": 1.8446744073709551617e19}"#)]
    #[case(r#"{"n": [123456789012345678901234567890]}"#, r#"{"n": [1.2345678901234567890123456789e29]}"#)]
    fn test_contains_wide_numbers(#[case] doc: &str, #[case] query: &str) {
        let node = leaf(parse_document(doc).unwrap());
        let operand = QueryOperand::Document(parse_document(query).unwrap());
        assert!(eval(&node, Strategy::Contains, operand));
    }

    #[test]
    fn test_exists_all_and_any() {
        let node = leaf(json!({"a": 1, "b": 2}));
        let present = QueryOperand::KeySet(vec!["a".into(), "b".into()]);
        assert!(eval(&node, Strategy::ExistsAll, present.clone()));
        assert!(eval(&node, Strategy::ExistsAny, present));
        assert!(eval(&node, Strategy::ExistsAny, QueryOperand::KeySet(vec!["zzz".into(), "a".into()])));
        // an empty key set is trivially satisfied by ALL and never by ANY
        assert!(eval(&node, Strategy::ExistsAll, QueryOperand::KeySet(vec![])));
        assert!(!eval(&node, Strategy::ExistsAny, QueryOperand::KeySet(vec![])));
    }

    #[rstest]
    #[case(Strategy::Contains, QueryOperand::Document(json!({"q": 1})))]
    #[case(Strategy::Exists, QueryOperand::SingleKey("q".into()))]
    #[case(Strategy::ExistsAny, QueryOperand::KeySet(vec!["q".into()]))]
    #[case(Strategy::ExistsAll, QueryOperand::KeySet(vec!["q".into()]))]
    fn test_saturated_matches_everything(#[case] strategy: Strategy, #[case] operand: QueryOperand) {
        let verdict = consistent(
            &Signature::Saturated,
            strategy,
            &operand,
            &mut QueryCache::new(),
            &GistOptions::default(),
        )
        .unwrap();
        assert_eq!(verdict, Verdict { matches: true, recheck: true });
    }

    #[rstest]
    #[case(Strategy::Contains, QueryOperand::SingleKey("a".into()))]
    #[case(Strategy::Exists, QueryOperand::KeySet(vec![]))]
    #[case(Strategy::ExistsAny, QueryOperand::Document(json!({})))]
    #[case(Strategy::ExistsAll, QueryOperand::SingleKey("a".into()))]
    fn test_operand_mismatch(#[case] strategy: Strategy, #[case] operand: QueryOperand) {
        let result = consistent(
            &Signature::empty(),
            strategy,
            &operand,
            &mut QueryCache::new(),
            &GistOptions::default(),
        );
        assert!(matches!(result, Err(Error::OperandMismatch { .. })));
        assert!(Query::new(strategy, operand, GistOptions::default()).is_err());
    }

    #[test]
    fn test_cache_is_reused() {
        let options = GistOptions::default();
        let node = leaf(json!({"a": 1}));
        let operand = QueryOperand::SingleKey("a".into());
        let mut cache = QueryCache::new();
        assert!(!cache.is_initialized());
        assert!(consistent(&node, Strategy::Exists, &operand, &mut cache, &options).unwrap().matches);
        assert!(cache.is_initialized());

        // the cached position wins over the operand passed later in the same query
        let other = QueryOperand::SingleKey("does-not-matter".into());
        assert!(consistent(&node, Strategy::Exists, &other, &mut cache, &options).unwrap().matches);
    }

    #[test]
    fn test_cache_mismatch() {
        let options = GistOptions::default();
        let mut cache = QueryCache::new();
        let keys = QueryOperand::KeySet(vec!["a".into()]);
        consistent(&Signature::empty(), Strategy::ExistsAny, &keys, &mut cache, &options).unwrap();
        let result = consistent(&Signature::empty(), Strategy::ExistsAll, &keys, &mut cache, &options);
        assert!(matches!(
            result,
            Err(Error::CacheMismatch { cached: "EXISTS_ANY", requested: "EXISTS_ALL" })
        ));
    }

    #[test]
    fn test_keys_skipping_nulls() {
        let operand = QueryOperand::keys_skipping_nulls([Some("a"), None, Some("b")]);
        assert_eq!(operand, QueryOperand::KeySet(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_query_bundle() {
        let options = GistOptions::default();
        let node = leaf(json!({"name": "x", "tags": ["t1"]}));
        assert!(Query::exists("name", options).unwrap().consistent(&node).unwrap().matches);
        assert!(Query::exists_all(["name", "tags"], options).unwrap().consistent(&node).unwrap().matches);
        assert!(Query::exists_any(["nope", "tags"], options).unwrap().consistent(&node).unwrap().matches);
        let mut contains = Query::contains(json!({"tags": ["t1"]}), options).unwrap();
        assert_eq!(contains.strategy(), Strategy::Contains);
        assert!(contains.consistent(&node).unwrap().matches);
        assert!(contains.consistent(&Signature::Saturated).unwrap().matches);
        assert!(!contains.consistent(&Signature::empty()).unwrap().matches);
    }
}
