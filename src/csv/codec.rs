//! Convert between raw field tokens and logical cell values.
//!
//! Both directions are total: malformed quoting is trimmed as well as possible on the way
//! in, and anything that could break the one-row-per-line layout is dropped on the way out.

use super::options::FormatConfig;

pub const DEFAULT_DELIMITER: char = ';';
pub const DEFAULT_QUOTE: char = '"';
/// The quote used in place of the configured one when quote swapping is on.
pub const ALTERNATE_QUOTE: char = '\'';

/// Unescape one raw token into its logical value.
///
/// A token that both starts and ends with the quote character loses exactly one quote at
/// each end, and every doubled quote inside collapses to one. Anything else is returned
/// as-is.
pub fn parse(token: &str, config: &FormatConfig) -> String {
    let quote = config.quote();
    if !(token.starts_with(quote) && token.ends_with(quote)) {
        return token.to_string();
    }
    // A lone quote is both the opening and the closing one
    if token.len() == quote.len_utf8() {
        return String::new();
    }
    let inner = &token[quote.len_utf8()..token.len() - quote.len_utf8()];
    inner.replace(&doubled(quote), quote.encode_utf8(&mut [0; 4]))
}

/// Escape one logical value into a token that [`parse`] will read back.
pub fn render(data: &str, config: &FormatConfig) -> String {
    let data: String = data.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    let wrap = needs_quoting(&data, config);
    let escaped = escape_quotes(&data, config);
    if wrap {
        let quote = config.quote();
        let mut token = String::with_capacity(escaped.len() + 2 * quote.len_utf8());
        token.push(quote);
        token.push_str(&escaped);
        token.push(quote);
        token
    } else {
        escaped
    }
}

/// A field is wrapped if it holds the delimiter, the configured quote, or the default quote
fn needs_quoting(data: &str, config: &FormatConfig) -> bool {
    data.contains(config.delimiter()) || data.contains(config.quote()) || data.contains(DEFAULT_QUOTE)
}

fn escape_quotes(data: &str, config: &FormatConfig) -> String {
    let quote = config.quote();
    if config.swap_quotes() {
        let new_quote = if quote == ALTERNATE_QUOTE {
            DEFAULT_QUOTE
        } else {
            ALTERNATE_QUOTE
        };
        let old_quote = if quote == DEFAULT_QUOTE {
            DEFAULT_QUOTE
        } else {
            ALTERNATE_QUOTE
        };
        if new_quote != old_quote {
            return data.replace(old_quote, new_quote.encode_utf8(&mut [0; 4]));
        }
    }
    data.replace(quote, &doubled(quote))
}

fn doubled(quote: char) -> String {
    [quote, quote].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> FormatConfig {
        FormatConfig::default()
    }

    #[test]
    fn test_parse_unquoted() {
        assert_eq!(parse("", &config()), "");
        assert_eq!(parse("qwe", &config()), "qwe");
        assert_eq!(parse(" ", &config()), " ");
        // Only the configured quote is stripped
        assert_eq!(parse("'qwe'", &config()), "'qwe'");
    }

    #[test]
    fn test_parse_quoted() {
        assert_eq!(parse("\"qw;e\"", &config()), "qw;e");
        assert_eq!(parse("\"say \"\"hi\"\"\"", &config()), "say \"hi\"");
        assert_eq!(parse("\"\"", &config()), "");
        assert_eq!(parse("\"", &config()), "");
    }

    #[test]
    fn test_parse_strips_one_quote_per_side() {
        // Four quotes: strip the outer pair, the inner doubled pair becomes one quote
        assert_eq!(parse("\"\"\"\"", &config()), "\"");
        assert_eq!(parse("\"\"x\"\"", &config()), "\"x\"");
    }

    #[test]
    fn test_parse_unbalanced_is_tolerated() {
        assert_eq!(parse("\"open", &config()), "\"open");
        assert_eq!(parse("close\"", &config()), "close\"");
    }

    #[test]
    fn test_parse_custom_quote() {
        let config = FormatConfig::new().with_quote('\'');
        assert_eq!(parse("'it''s'", &config), "it's");
        assert_eq!(parse("\"qwe\"", &config), "\"qwe\"");
    }

    #[test]
    fn test_render_plain() {
        assert_eq!(render("qwe", &config()), "qwe");
        assert_eq!(render("", &config()), "");
    }

    #[test]
    fn test_render_quotes_delimiter() {
        assert_eq!(render("r;ty", &config()), "\"r;ty\"");
        let comma = FormatConfig::new().with_delimiter(',');
        assert_eq!(render("r;ty", &comma), "r;ty");
        assert_eq!(render("r,ty", &comma), "\"r,ty\"");
    }

    #[test]
    fn test_render_doubles_quotes() {
        assert_eq!(render("say \"hi\"", &config()), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_render_strips_line_breaks() {
        assert_eq!(render("a\r\nb\nc\rd", &config()), "abcd");
    }

    #[test]
    fn test_render_default_quote_forces_wrapping() {
        let config = FormatConfig::new().with_quote('\'');
        // Wrapped because of the default quote, but only the configured quote is escaped
        assert_eq!(render("a\"b", &config), "'a\"b'");
        assert_eq!(render("it's", &config), "'it''s'");
    }

    #[test]
    fn test_render_swap_quotes() {
        let config = FormatConfig::new().with_swap_quotes(true);
        assert_eq!(render("say \"hi\"", &config), "\"say 'hi'\"");

        let single = FormatConfig::new().with_quote('\'').with_swap_quotes(true);
        assert_eq!(render("it's", &single), "'it\"s'");
    }

    #[test]
    fn test_render_swap_quotes_with_other_quote_doubles() {
        let config = FormatConfig::new().with_quote('|').with_swap_quotes(true);
        assert_eq!(render("a|b", &config), "|a||b|");
    }

    proptest! {
        #[test]
        fn prop_plain_tokens_survive(token in "[a-zA-Z0-9 ,.:-]*") {
            prop_assert_eq!(render(&parse(&token, &config()), &config()), token);
        }

        #[test]
        fn prop_values_round_trip(data in "[a-z;\"' ]*") {
            prop_assert_eq!(parse(&render(&data, &config()), &config()), data);
        }
    }
}
