use std::collections::{HashMap, HashSet};

use super::numeric::NumericMatcher;
use super::{
    Keyword, KeywordId, LanguageError, LanguageProvider, MarkerPair, OperatorDefinition,
    OperatorId, OperatorKind, TextEscape,
};
use crate::scanner::CommentSyntax;

const BRACE_CHARS: [char; 4] = ['(', ')', '[', ']'];

/// A validated, lookup-friendly copy of a provider's configuration.
///
/// Built once per [`ExpressionParser`](crate::ExpressionParser) and shared
/// read-only by every parse.
#[derive(Debug)]
pub(crate) struct CompiledLanguage {
    pub keywords: Vec<Keyword>,
    pub operators: Vec<OperatorDefinition>,
    pub numeric: NumericMatcher,
    pub code_block: Option<MarkerPair>,
    pub separator: Option<char>,
    pub comments: CommentSyntax,
    pub quote_chars: Vec<char>,
    pub text_escape: TextEscape,
    pub case_sensitive: bool,
    pub supports_prefixes: bool,
    pub supports_keywords: bool,
    /// Trigger keyword -> indices into the provider's custom parser list
    custom_parsers: HashMap<KeywordId, Vec<usize>>,
}

impl CompiledLanguage {
    pub fn compile(provider: &dyn LanguageProvider) -> Result<Self, LanguageError> {
        let config = provider.config();
        let case_sensitive = config.case_sensitive;
        let fold = |s: &str| {
            if case_sensitive {
                s.to_string()
            } else {
                s.to_lowercase()
            }
        };

        // Keywords
        let mut keyword_ids = HashSet::new();
        let mut keyword_texts = HashSet::new();
        for keyword in &config.keywords {
            if keyword.text.trim().is_empty() {
                return Err(LanguageError::EmptyKeyword(keyword.id));
            }
            if !keyword_ids.insert(keyword.id) {
                return Err(LanguageError::DuplicateKeywordId(keyword.id));
            }
            if !keyword_texts.insert(fold(&keyword.text)) {
                return Err(LanguageError::DuplicateKeyword(keyword.text.clone()));
            }
        }

        // Operators: explicit ids first, then fill the gaps in table order
        let mut used_ids: HashSet<OperatorId> = HashSet::new();
        for operator in &config.operators {
            if let Some(id) = operator.id {
                if !used_ids.insert(id) {
                    return Err(LanguageError::DuplicateOperatorId(id));
                }
            }
        }

        let mut next_id = 1;
        let mut operators = Vec::with_capacity(config.operators.len());
        let mut signatures: HashSet<(Vec<String>, OperatorKind)> = HashSet::new();

        for (index, operator) in config.operators.iter().enumerate() {
            validate_operator_name(index, &operator.name_parts)?;

            let signature: Vec<String> = operator.name_parts.iter().map(|p| fold(p)).collect();
            if !signatures.insert((signature, operator.kind)) {
                return Err(LanguageError::DuplicateOperator {
                    name: operator.name_parts.join(" "),
                    kind: operator.kind,
                });
            }

            let id = match operator.id {
                Some(id) => id,
                None => {
                    while used_ids.contains(&OperatorId(next_id)) {
                        next_id += 1;
                    }
                    let id = OperatorId(next_id);
                    used_ids.insert(id);
                    id
                }
            };

            operators.push(OperatorDefinition {
                id,
                name_parts: operator.name_parts.clone(),
                kind: operator.kind,
                priority: operator.priority,
            });
        }

        // Markers
        if let Some(markers) = &config.code_block {
            validate_marker("code block start", &markers.start)?;
            validate_marker("code block end", &markers.end)?;
        }
        if let Some(markers) = &config.multiline_comment {
            validate_marker("multiline comment start", &markers.start)?;
            validate_marker("multiline comment end", &markers.end)?;
        }
        if let Some(marker) = &config.line_comment {
            validate_marker("line comment", marker)?;
        }
        if let Some(separator) = config.separator {
            if BRACE_CHARS.contains(&separator) || separator == ',' || separator.is_whitespace() {
                return Err(LanguageError::InvalidMarker {
                    marker: "separator",
                    reason: format!("'{}' is reserved", separator),
                });
            }
        }
        for quote in &config.quote_chars {
            if BRACE_CHARS.contains(quote) || *quote == ',' || Some(*quote) == config.separator {
                return Err(LanguageError::InvalidMarker {
                    marker: "quote",
                    reason: format!("'{}' is reserved", quote),
                });
            }
        }

        // Custom parsers
        let mut custom_parsers: HashMap<KeywordId, Vec<usize>> = HashMap::new();
        for (index, parser) in provider.custom_expression_parsers().iter().enumerate() {
            for keyword in parser.keyword_ids() {
                if !keyword_ids.contains(keyword) {
                    return Err(LanguageError::UnknownKeyword(*keyword));
                }
                custom_parsers.entry(*keyword).or_default().push(index);
            }
        }

        Ok(CompiledLanguage {
            keywords: config.keywords.clone(),
            operators,
            numeric: NumericMatcher::compile(&config.numeric_types)?,
            code_block: config.code_block.clone(),
            separator: config.separator,
            comments: CommentSyntax {
                line: config.line_comment.clone(),
                multiline: config
                    .multiline_comment
                    .as_ref()
                    .map(|m| (m.start.clone(), m.end.clone())),
            },
            quote_chars: config.quote_chars.clone(),
            text_escape: config.text_escape,
            case_sensitive,
            supports_prefixes: config.supports_prefixes,
            supports_keywords: config.supports_keywords,
            custom_parsers,
        })
    }

    /// Indices of the custom parsers triggered by `keyword`.
    pub fn custom_parsers_for(&self, keyword: KeywordId) -> &[usize] {
        self.custom_parsers
            .get(&keyword)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn validate_operator_name(index: usize, parts: &[String]) -> Result<(), LanguageError> {
    if parts.is_empty() {
        return Err(LanguageError::InvalidOperatorName {
            index,
            reason: "no name parts".to_string(),
        });
    }
    for part in parts {
        if part.is_empty() || part.chars().any(char::is_whitespace) {
            return Err(LanguageError::InvalidOperatorName {
                index,
                reason: format!("name part '{}' is empty or contains whitespace", part),
            });
        }
        if part.chars().any(|c| BRACE_CHARS.contains(&c) || c == ',') {
            return Err(LanguageError::InvalidOperatorName {
                index,
                reason: format!("name part '{}' contains a brace or comma", part),
            });
        }
    }
    Ok(())
}

fn validate_marker(marker: &'static str, text: &str) -> Result<(), LanguageError> {
    if text.is_empty() || text.chars().any(char::is_whitespace) {
        return Err(LanguageError::InvalidMarker {
            marker,
            reason: format!("'{}' is empty or contains whitespace", text),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{Language, LanguageConfig, OperatorConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_operator_ids_fill_gaps() {
        let config = LanguageConfig::default()
            .with_operator(OperatorConfig::binary("+", 30))
            .with_operator(OperatorConfig::binary("-", 30).with_id(1))
            .with_operator(OperatorConfig::prefix("-", 0));
        let compiled = CompiledLanguage::compile(&Language::new(config)).unwrap();

        let ids: Vec<u32> = compiled.operators.iter().map(|o| o.id.0).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(compiled.operators[1].id, OperatorId(1));
        assert_eq!(compiled.operators[1].name(), "-");
    }

    #[test]
    fn test_same_name_different_kind_is_allowed() {
        let config = LanguageConfig::default()
            .with_operator(OperatorConfig::binary("-", 30))
            .with_operator(OperatorConfig::prefix("-", 0));
        assert!(CompiledLanguage::compile(&Language::new(config)).is_ok());
    }

    #[test]
    fn test_duplicate_operator_rejected() {
        let config = LanguageConfig {
            case_sensitive: false,
            ..LanguageConfig::default()
        }
        .with_operator(OperatorConfig::binary("and", 50))
        .with_operator(OperatorConfig::binary("AND", 50));

        let err = CompiledLanguage::compile(&Language::new(config)).unwrap_err();
        assert!(matches!(err, LanguageError::DuplicateOperator { .. }));
    }

    #[test]
    fn test_duplicate_keyword_rejected() {
        let config = LanguageConfig::default()
            .with_keyword(1, "public")
            .with_keyword(2, "public");
        let err = CompiledLanguage::compile(&Language::new(config)).unwrap_err();
        assert!(matches!(err, LanguageError::DuplicateKeyword(_)));
    }

    #[test]
    fn test_reserved_separator_rejected() {
        let config = LanguageConfig {
            separator: Some(','),
            ..LanguageConfig::default()
        };
        let err = CompiledLanguage::compile(&Language::new(config)).unwrap_err();
        assert!(matches!(err, LanguageError::InvalidMarker { marker: "separator", .. }));
    }
}
