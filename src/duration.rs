//! Cycle lengths: integer arithmetic over optionally suffixed durations.
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := number unit? | '(' expr ')'
//! unit   := 's' | 'm' | 'h' | 'd' | 'w'
//! ```

use crate::errors::CycleLengthError;

/// Evaluates a cycle length, in seconds.
///
/// ```rust
/// use cron_countdown::parse_cycle_length;
///
/// assert_eq!(Ok(604_800), parse_cycle_length("7*24*3600"));
/// assert_eq!(Ok(604_800), parse_cycle_length("1w"));
/// assert_eq!(Ok(5_400), parse_cycle_length("1h + 30m"));
/// ```
pub fn parse_cycle_length(text: &str) -> Result<u64, CycleLengthError> {
    let mut parser = Parser {
        chars: text.char_indices().filter(|(_, c)| !c.is_whitespace()).collect(),
        pos: 0,
    };
    let value = parser.expr()?;
    if let Some(&(at, c)) = parser.peek() {
        return Err(if c == ')' {
            CycleLengthError::Unbalanced(at)
        } else {
            CycleLengthError::UnexpectedChar(at, c)
        });
    }
    u64::try_from(value).map_err(|_| CycleLengthError::Negative(value))
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(usize, char)> {
        self.chars.get(self.pos)
    }

    fn next(&mut self) -> Option<(usize, char)> {
        let c = self.chars.get(self.pos).copied();
        self.pos += 1;
        c
    }

    fn expr(&mut self) -> Result<i64, CycleLengthError> {
        let mut value = self.term()?;
        while let Some(&(_, op)) = self.peek() {
            let rhs = match op {
                '+' | '-' => {
                    self.pos += 1;
                    self.term()?
                }
                _ => break,
            };
            value = match op {
                '+' => value.checked_add(rhs),
                _ => value.checked_sub(rhs),
            }
            .ok_or(CycleLengthError::Overflow)?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<i64, CycleLengthError> {
        let mut value = self.factor()?;
        while let Some(&(_, op)) = self.peek() {
            let rhs = match op {
                '*' | '/' => {
                    self.pos += 1;
                    self.factor()?
                }
                _ => break,
            };
            value = match op {
                '*' => value.checked_mul(rhs).ok_or(CycleLengthError::Overflow)?,
                _ if rhs == 0 => return Err(CycleLengthError::DivisionByZero),
                _ => value.checked_div(rhs).ok_or(CycleLengthError::Overflow)?,
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<i64, CycleLengthError> {
        match self.next() {
            Some((at, '(')) => {
                let value = self.expr()?;
                match self.next() {
                    Some((_, ')')) => Ok(value),
                    _ => Err(CycleLengthError::Unbalanced(at)),
                }
            }
            Some((_, c)) if c.is_ascii_digit() => {
                let mut value = i64::from(c as u8 - b'0');
                while let Some(&(_, c)) = self.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    self.pos += 1;
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(i64::from(c as u8 - b'0')))
                        .ok_or(CycleLengthError::Overflow)?;
                }
                let unit = match self.peek() {
                    Some((_, 's')) => 1,
                    Some((_, 'm')) => 60,
                    Some((_, 'h')) => 3_600,
                    Some((_, 'd')) => 86_400,
                    Some((_, 'w')) => 604_800,
                    _ => return Ok(value),
                };
                self.pos += 1;
                value.checked_mul(unit).ok_or(CycleLengthError::Overflow)
            }
            Some((at, c)) => Err(CycleLengthError::UnexpectedChar(at, c)),
            None => Err(CycleLengthError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers() {
        assert_eq!(Ok(86_400), parse_cycle_length("86400"));
        assert_eq!(Ok(0), parse_cycle_length("0"));
        assert_eq!(Ok(42), parse_cycle_length("  4 2 "));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(Ok(604_800), parse_cycle_length("7 * 24 * 3600"));
        assert_eq!(Ok(14), parse_cycle_length("2 + 3 * 4"));
        assert_eq!(Ok(20), parse_cycle_length("(2 + 3) * 4"));
        assert_eq!(Ok(3), parse_cycle_length("10 / 3"));
        assert_eq!(Ok(1), parse_cycle_length("10 - 3 - 6"));
    }

    #[test]
    fn units() {
        assert_eq!(Ok(90), parse_cycle_length("1m + 30s"));
        assert_eq!(Ok(2 * 86_400 + 12 * 3_600), parse_cycle_length("2d + 12h"));
        assert_eq!(Ok(1_209_600), parse_cycle_length("2w"));
        assert_eq!(Ok(43_200), parse_cycle_length("1d / 2"));
    }

    #[test]
    fn errors() {
        assert_eq!(Err(CycleLengthError::UnexpectedEnd), parse_cycle_length(""));
        assert_eq!(Err(CycleLengthError::UnexpectedEnd), parse_cycle_length("1 +"));
        assert_eq!(Err(CycleLengthError::DivisionByZero), parse_cycle_length("1/0"));
        assert_eq!(Err(CycleLengthError::Negative(-1)), parse_cycle_length("1-2"));
        assert_eq!(Err(CycleLengthError::Unbalanced(0)), parse_cycle_length("(1+2"));
        assert_eq!(Err(CycleLengthError::Unbalanced(3)), parse_cycle_length("1+2)"));
        assert_eq!(
            Err(CycleLengthError::UnexpectedChar(0, 'a')),
            parse_cycle_length("alert(1)")
        );
        assert_eq!(
            Err(CycleLengthError::UnexpectedChar(2, 'x')),
            parse_cycle_length("1dx")
        );
        assert_eq!(
            Err(CycleLengthError::Overflow),
            parse_cycle_length("99999999999w * 99999999999")
        );
    }
}
