//! Single-pass scanner splitting step text into literal and parameter segments.

use crate::errors::StepTextError;

/// Characters that lose their backslash when escaped in plain text.
const SPECIAL_CHARACTERS: [char; 6] = ['{', '}', '"', '<', '>', '\\'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Quoted(String),
    Angle {
        /// Text before the first unescaped `:`, when one was present.
        prefix: Option<String>,
        body: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Default,
    Quotes { start: usize },
    Angle { start: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text(Region),
    Escape(Region),
}

struct Scanner {
    segments: Vec<Segment>,
    buffer: String,
    prefix: Option<String>,
}

impl Scanner {
    fn flush_literal(&mut self) {
        if !self.buffer.is_empty() {
            self.segments
                .push(Segment::Literal(std::mem::take(&mut self.buffer)));
        }
    }

    fn close_quotes(&mut self) {
        self.segments
            .push(Segment::Quoted(std::mem::take(&mut self.buffer)));
    }

    fn close_angle(&mut self) {
        let body = std::mem::take(&mut self.buffer);
        let prefix = self.prefix.take();
        self.segments.push(Segment::Angle { prefix, body });
    }

    fn push_escaped(&mut self, region: Region, ch: char) {
        match region {
            Region::Default if SPECIAL_CHARACTERS.contains(&ch) => self.buffer.push(ch),
            Region::Default => {
                self.buffer.push('\\');
                self.buffer.push(ch);
            }
            Region::Quotes { .. } | Region::Angle { .. } => self.buffer.push(match ch {
                't' => '\t',
                'n' => '\n',
                other => other,
            }),
        }
    }

    fn step(&mut self, region: Region, pos: usize, ch: char) -> Result<State, StepTextError> {
        let next = match (region, ch) {
            (_, '\\') => return Ok(State::Escape(region)),
            (Region::Default, '"') => {
                self.flush_literal();
                Region::Quotes { start: pos }
            }
            (Region::Default, '<') => {
                self.flush_literal();
                Region::Angle { start: pos }
            }
            (Region::Default, '{' | '}') => {
                return Err(StepTextError::ReservedCharacter {
                    character: ch,
                    position: pos,
                });
            }
            (Region::Quotes { .. }, '"') => {
                self.close_quotes();
                Region::Default
            }
            (Region::Angle { .. }, '>') => {
                self.close_angle();
                Region::Default
            }
            (Region::Angle { .. }, ':') if self.prefix.is_none() => {
                self.prefix = Some(std::mem::take(&mut self.buffer));
                region
            }
            _ => {
                self.buffer.push(ch);
                region
            }
        };
        Ok(State::Text(next))
    }
}

/// Split `text` into segments, honouring quotes, angle brackets and escapes.
pub(crate) fn scan_step_text(text: &str) -> Result<Vec<Segment>, StepTextError> {
    let mut scanner = Scanner {
        segments: Vec::new(),
        buffer: String::new(),
        prefix: None,
    };
    let mut state = State::Text(Region::Default);

    for (pos, ch) in text.char_indices() {
        state = match state {
            State::Escape(region) => {
                scanner.push_escaped(region, ch);
                State::Text(region)
            }
            State::Text(region) => scanner.step(region, pos, ch)?,
        };
    }

    let region = match state {
        State::Escape(region) => {
            scanner.buffer.push('\\');
            region
        }
        State::Text(region) => region,
    };
    match region {
        Region::Default => {
            scanner.flush_literal();
            Ok(scanner.segments)
        }
        Region::Quotes { start } => Err(StepTextError::UnterminatedString { start }),
        Region::Angle { start } => Err(StepTextError::UnterminatedParameter { start }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step_text::test_support::{scan_err, scan_ok};

    fn literal(text: &str) -> Segment {
        Segment::Literal(text.into())
    }

    #[test]
    fn splits_quotes_and_angles() {
        assert_eq!(
            scan_ok("enter \"admin\" and <pwd>"),
            vec![
                literal("enter "),
                Segment::Quoted("admin".into()),
                literal(" and "),
                Segment::Angle {
                    prefix: None,
                    body: "pwd".into(),
                },
            ]
        );
    }

    #[test]
    fn records_first_unescaped_colon_only() {
        assert_eq!(
            scan_ok("<file:a:b>"),
            vec![Segment::Angle {
                prefix: Some("file".into()),
                body: "a:b".into(),
            }]
        );
        assert_eq!(
            scan_ok("<a\\:b>"),
            vec![Segment::Angle {
                prefix: None,
                body: "a:b".into(),
            }]
        );
    }

    #[test]
    fn keeps_backslash_before_ordinary_characters() {
        assert_eq!(scan_ok("match \\d+"), vec![literal("match \\d+")]);
        assert_eq!(scan_ok("ends with \\"), vec![literal("ends with \\")]);
    }

    #[test]
    fn translates_tab_and_newline_inside_quotes() {
        assert_eq!(
            scan_ok("\"a\\tb\\nc\""),
            vec![Segment::Quoted("a\tb\nc".into())]
        );
    }

    #[test]
    fn allows_angles_and_braces_inside_quotes() {
        assert_eq!(
            scan_ok("\"<not a param> {}\""),
            vec![Segment::Quoted("<not a param> {}".into())]
        );
    }

    #[test]
    fn reports_unterminated_regions_at_their_opening() {
        assert_eq!(
            scan_err("say \"hi"),
            StepTextError::UnterminatedString { start: 4 }
        );
        assert_eq!(
            scan_err("use <name"),
            StepTextError::UnterminatedParameter { start: 4 }
        );
    }

    #[test]
    fn rejects_closing_brace_in_plain_text() {
        assert_eq!(
            scan_err("a } b"),
            StepTextError::ReservedCharacter {
                character: '}',
                position: 2,
            }
        );
    }
}
