//! Single-pass line tokenizer.
//!
//! The scanner walks the line once, left to right. At each position it tries,
//! in order: whitespace, line comment, block comment, string literal, number,
//! identifier/keyword, operator. Operators use longest match (3, then 2, then
//! 1 characters) so `===` is never split into `==` `=`.

use crate::language::{CodeRules, Language};
use crate::{SyntaxToken, TokenKind};

/// Tokenizes one line.
///
/// Returned tokens are ordered, non-overlapping byte ranges. Whitespace and
/// unrecognized characters produce no token.
pub fn tokenize(line: &str, language: Language) -> Vec<SyntaxToken> {
    match language {
        Language::Markdown => scan_markdown(line),
        _ => match language.rules() {
            Some(rules) => scan_code(line, rules),
            None => Vec::new(),
        },
    }
}

fn char_at(line: &str, i: usize) -> Option<char> {
    line[i..].chars().next()
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

/// Returns the end of the run of characters starting at `i` matching `pred`.
fn take_while(line: &str, i: usize, pred: impl Fn(char) -> bool) -> usize {
    line[i..]
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(line.len(), |(off, _)| i + off)
}

/// Scans a quoted literal opened at `i`. Unterminated literals run to EOL.
fn scan_string(line: &str, i: usize, quote: char) -> usize {
    let mut chars = line[i + quote.len_utf8()..].char_indices();
    while let Some((off, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return i + quote.len_utf8() + off + c.len_utf8();
        }
    }
    line.len()
}

fn scan_number(line: &str, i: usize) -> usize {
    let prefix = line[i..].get(..2).map(str::to_ascii_lowercase);
    if matches!(prefix.as_deref(), Some("0x" | "0b" | "0o")) {
        let digits = take_while(line, i + 2, |c| c.is_ascii_hexdigit() || c == '_');
        return take_while(line, digits, |c| c == 'n');
    }

    let mut end = take_while(line, i, |c| c.is_ascii_digit() || c == '_');
    if char_at(line, end) == Some('.')
        && char_at(line, end + 1).is_some_and(|c| c.is_ascii_digit())
    {
        end = take_while(line, end + 1, |c| c.is_ascii_digit() || c == '_');
    }
    if matches!(char_at(line, end), Some('e' | 'E')) {
        let mut exp = end + 1;
        if matches!(char_at(line, exp), Some('+' | '-')) {
            exp += 1;
        }
        if char_at(line, exp).is_some_and(|c| c.is_ascii_digit()) {
            end = take_while(line, exp, |c| c.is_ascii_digit());
        }
    }
    if char_at(line, end) == Some('n') {
        end += 1;
    }
    end
}

/// Longest-match operator lookup: 3, then 2, then 1 characters.
fn match_operator(rest: &str, operators: &[&str]) -> Option<usize> {
    (1..=3).rev().find(|&width| {
        rest.get(..width)
            .is_some_and(|candidate| operators.contains(&candidate))
    })
}

fn scan_code(line: &str, rules: &CodeRules) -> Vec<SyntaxToken> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while let Some(ch) = char_at(line, i) {
        let rest = &line[i..];

        if ch.is_whitespace() {
            i += ch.len_utf8();
            continue;
        }

        if let Some(marker) = rules.line_comment {
            if rest.starts_with(marker) {
                tokens.push(SyntaxToken::new(i, line.len(), TokenKind::Comment));
                break;
            }
        }

        if let Some((open, close)) = rules.block_comment {
            if rest.starts_with(open) {
                let body = i + open.len();
                let end = line[body..]
                    .find(close)
                    .map_or(line.len(), |off| body + off + close.len());
                tokens.push(SyntaxToken::new(i, end, TokenKind::Comment));
                i = end;
                continue;
            }
        }

        if rules.string_delims.contains(&ch) {
            let end = scan_string(line, i, ch);
            let is_key = rules.keys_as_types
                && line[end..].trim_start().starts_with(':');
            let kind = if is_key { TokenKind::Type } else { TokenKind::String };
            tokens.push(SyntaxToken::new(i, end, kind));
            i = end;
            continue;
        }

        let starts_number = ch.is_ascii_digit()
            || (ch == '.' && char_at(line, i + 1).is_some_and(|c| c.is_ascii_digit()));
        if starts_number {
            let end = scan_number(line, i);
            tokens.push(SyntaxToken::new(i, end, TokenKind::Number));
            i = end;
            continue;
        }

        if is_ident_start(ch) {
            let end = take_while(line, i, is_ident_continue);
            let word = &line[i..end];
            let kind = if rules.keywords.contains(&word) {
                TokenKind::Keyword
            } else if rules.types.contains(&word) {
                TokenKind::Type
            } else {
                TokenKind::Identifier
            };
            tokens.push(SyntaxToken::new(i, end, kind));
            i = end;
            continue;
        }

        if let Some(width) = match_operator(rest, rules.operators) {
            tokens.push(SyntaxToken::new(i, i + width, TokenKind::Operator));
            i += width;
            continue;
        }

        i += ch.len_utf8();
    }

    tokens
}

// ==================== Markdown ====================

fn scan_markdown(line: &str) -> Vec<SyntaxToken> {
    let indent = take_while(line, 0, |c| c == ' ');
    let body = &line[indent..];

    // Whole-line constructs
    if body.starts_with("```") || body.starts_with("~~~") {
        return vec![SyntaxToken::new(indent, line.len(), TokenKind::String)];
    }
    if indent <= 3 {
        let hashes = take_while(body, 0, |c| c == '#');
        if (1..=6).contains(&hashes) && body[hashes..].chars().next().is_none_or(|c| c == ' ') {
            return vec![SyntaxToken::new(indent, line.len(), TokenKind::Keyword)];
        }
    }

    let mut tokens = Vec::new();
    let mut i = indent;

    // Block markers: quote, bullet, ordered list
    if body.starts_with('>') {
        tokens.push(SyntaxToken::new(i, i + 1, TokenKind::Operator));
        i += 1;
    } else if matches!(body.get(..2), Some("- " | "* " | "+ ")) {
        tokens.push(SyntaxToken::new(i, i + 1, TokenKind::Operator));
        i += 1;
    } else {
        let digits = take_while(line, i, |c| c.is_ascii_digit());
        if digits > i
            && matches!(char_at(line, digits), Some('.' | ')'))
            && char_at(line, digits + 1).is_none_or(|c| c == ' ')
        {
            tokens.push(SyntaxToken::new(i, digits + 1, TokenKind::Number));
            i = digits + 1;
        }
    }

    while let Some(ch) = char_at(line, i) {
        let rest = &line[i..];

        if rest.starts_with("<!--") {
            let end = rest.find("-->").map_or(line.len(), |off| i + off + 3);
            tokens.push(SyntaxToken::new(i, end, TokenKind::Comment));
            i = end;
            continue;
        }

        if ch == '`' {
            let ticks = take_while(line, i, |c| c == '`');
            let fence = &line[i..ticks];
            let end = line[ticks..]
                .find(fence)
                .map_or(line.len(), |off| ticks + off + fence.len());
            tokens.push(SyntaxToken::new(i, end, TokenKind::String));
            i = end;
            continue;
        }

        if let Some(width) = match_operator(rest, &["**", "__", "~~", "*", "_", "[", "]", "(", ")"]) {
            tokens.push(SyntaxToken::new(i, i + width, TokenKind::Operator));
            i += width;
            continue;
        }

        i += ch.len_utf8();
    }

    tokens
}
