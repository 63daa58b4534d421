use crate::composer::Composer;
use crate::dfa::DFA;
use crate::error_handling::Error::{
    EmptyUnion, IOError, InvalidPatternNode, InvalidSchema, MissingSchemaKey,
    UndefinedPatternReference, UnknownPatternOperator, YamlParsingError,
};
use crate::error_handling::Result;
use indexmap::IndexMap;
use log::debug;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::io::Read;

/// Named patterns loaded from a YAML schema. Each pattern is a tree of
/// composition operators over string symbols:
///
/// ```yaml
/// patterns:
///   digits: { plus: { unit: digit } }
///   int:    { chain: [ { maybe: { unit: "-" } }, { ref: digits } ] }
/// ```
pub struct PatternSchema {
    patterns: IndexMap<String, Composer<String>>,
}

impl PatternSchema {
    pub fn get_patterns(&self) -> &IndexMap<String, Composer<String>> {
        &self.patterns
    }

    pub fn get_pattern(&self, name: &str) -> Option<&Composer<String>> {
        self.patterns.get(name)
    }

    pub fn build(&self, name: &str) -> Option<DFA<String>> {
        self.patterns.get(name).map(|pattern| pattern.build())
    }

    pub fn build_all(&self) -> IndexMap<String, DFA<String>> {
        self.patterns
            .iter()
            .map(|(name, pattern)| (name.clone(), pattern.build()))
            .collect()
    }
}

impl PatternSchema {
    const PATTERNS_KEY: &'static str = "patterns";

    const UNIT_OP: &'static str = "unit";
    const TOKENS_OP: &'static str = "tokens";
    const CHAIN_OP: &'static str = "chain";
    const OR_OP: &'static str = "or";
    const MAYBE_OP: &'static str = "maybe";
    const PLUS_OP: &'static str = "plus";
    const STAR_OP: &'static str = "star";
    const INVERSE_OP: &'static str = "inverse";
    const RELABEL_OP: &'static str = "relabel";
    const REF_OP: &'static str = "ref";

    const RELABEL_PATTERN_KEY: &'static str = "pattern";
    const RELABEL_MAP_KEY: &'static str = "map";

    pub fn parse_from_file(yaml_file_path: &str) -> Result<PatternSchema> {
        match std::fs::File::open(yaml_file_path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    return Err(IOError(e));
                }
                Self::parse_from_str(contents.as_str())
            }
            Err(e) => Err(IOError(e)),
        }
    }

    pub fn parse_from_str(yaml_content: &str) -> Result<PatternSchema> {
        match Self::load_kv_pairs_from_yaml_content(yaml_content) {
            Ok(kv_pairs) => Self::load_from_kv_pairs(kv_pairs),
            Err(e) => Err(YamlParsingError(e)),
        }
    }

    fn get_key_value<'a>(
        kv_map: &'a IndexMap<String, Value>,
        key: &'static str,
    ) -> Result<&'a Value> {
        kv_map.get(key).ok_or(MissingSchemaKey(key))
    }

    fn load_kv_pairs_from_yaml_content(
        yaml_content: &str,
    ) -> serde_yaml::Result<IndexMap<String, Value>> {
        let kv_map_result: IndexMap<String, Value> = serde_yaml::from_str(yaml_content)?;
        Ok(kv_map_result)
    }

    fn load_from_kv_pairs(kv_pairs: IndexMap<String, Value>) -> Result<Self> {
        let Value::Mapping(declared) = Self::get_key_value(&kv_pairs, Self::PATTERNS_KEY)? else {
            return Err(InvalidSchema);
        };

        // Patterns are compiled in declaration order, so a `ref` only sees
        // the ones above it.
        let mut patterns: IndexMap<String, Composer<String>> = IndexMap::new();
        for (key, node) in declared {
            let Value::String(name) = key else {
                return Err(InvalidSchema);
            };
            let pattern = Self::compile_node(name, node, &patterns)?;
            debug!(
                "loaded pattern `{}` ({} transitions)",
                name,
                pattern.get_transitions().len()
            );
            patterns.insert(name.clone(), pattern);
        }

        Ok(Self { patterns })
    }

    fn compile_node(
        pattern_name: &str,
        node: &Value,
        compiled: &IndexMap<String, Composer<String>>,
    ) -> Result<Composer<String>> {
        let invalid = || InvalidPatternNode(pattern_name.to_string());

        let Value::Mapping(map) = node else {
            return Err(invalid());
        };
        if map.len() != 1 {
            return Err(invalid());
        }
        let Some((Value::String(op), operand)) = map.iter().next() else {
            return Err(invalid());
        };

        match op.as_str() {
            Self::UNIT_OP => Ok(Composer::unit(Self::get_symbol(pattern_name, operand)?)),
            Self::TOKENS_OP => {
                let Value::Sequence(symbols) = operand else {
                    return Err(invalid());
                };
                let symbols = symbols
                    .iter()
                    .map(|symbol| Self::get_symbol(pattern_name, symbol))
                    .collect::<Result<Vec<String>>>()?;
                Ok(Composer::sequence(symbols))
            }
            Self::CHAIN_OP => {
                let children = Self::compile_children(pattern_name, operand, compiled)?;
                Ok(Composer::chain(&children))
            }
            Self::OR_OP => {
                let children = Self::compile_children(pattern_name, operand, compiled)?;
                Composer::union(&children).ok_or_else(|| EmptyUnion(pattern_name.to_string()))
            }
            Self::MAYBE_OP => Ok(Self::compile_node(pattern_name, operand, compiled)?.maybe()),
            Self::PLUS_OP => Ok(Self::compile_node(pattern_name, operand, compiled)?.plus()),
            Self::STAR_OP => Ok(Self::compile_node(pattern_name, operand, compiled)?.star()),
            Self::INVERSE_OP => {
                Ok(Self::compile_node(pattern_name, operand, compiled)?.inverse())
            }
            Self::RELABEL_OP => {
                let Value::Mapping(relabel) = operand else {
                    return Err(invalid());
                };
                let pattern = Self::get_mapping_value(relabel, Self::RELABEL_PATTERN_KEY)?;
                let pattern = Self::compile_node(pattern_name, pattern, compiled)?;
                let table = Self::get_relabel_table(
                    pattern_name,
                    Self::get_mapping_value(relabel, Self::RELABEL_MAP_KEY)?,
                )?;
                Ok(pattern.modify_transitions(|symbol| {
                    table.get(symbol).cloned().unwrap_or_else(|| symbol.clone())
                }))
            }
            Self::REF_OP => {
                let referenced = Self::get_symbol(pattern_name, operand)?;
                compiled
                    .get(&referenced)
                    .cloned()
                    .ok_or(UndefinedPatternReference(referenced))
            }
            unknown => Err(UnknownPatternOperator(unknown.to_string())),
        }
    }

    fn compile_children(
        pattern_name: &str,
        operand: &Value,
        compiled: &IndexMap<String, Composer<String>>,
    ) -> Result<Vec<Composer<String>>> {
        let Value::Sequence(children) = operand else {
            return Err(InvalidPatternNode(pattern_name.to_string()));
        };
        children
            .iter()
            .map(|child| Self::compile_node(pattern_name, child, compiled))
            .collect()
    }

    fn get_symbol(pattern_name: &str, value: &Value) -> Result<String> {
        match value {
            Value::String(symbol) => Ok(symbol.clone()),
            _ => Err(InvalidPatternNode(pattern_name.to_string())),
        }
    }

    fn get_mapping_value<'a>(mapping: &'a Mapping, key: &'static str) -> Result<&'a Value> {
        mapping.get(key).ok_or(MissingSchemaKey(key))
    }

    fn get_relabel_table(pattern_name: &str, value: &Value) -> Result<HashMap<String, String>> {
        let Value::Mapping(map) = value else {
            return Err(InvalidPatternNode(pattern_name.to_string()));
        };
        let mut table = HashMap::new();
        for (from, to) in map {
            table.insert(
                Self::get_symbol(pattern_name, from)?,
                Self::get_symbol(pattern_name, to)?,
            );
        }
        Ok(table)
    }
}
