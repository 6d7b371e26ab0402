//! Built-in string method table
//!
//! The default capability surface scripts can call on string values, e.g.
//! `%rank%.starts_with('vip')` or `name.length()`. All indexing is by
//! character, not byte, so scripts behave the same on multibyte text.

use super::MethodDef;
use crate::value::{TypeTag, Value};

fn str_arg(args: &[Value], index: usize) -> Result<&str, String> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("argument {} is not a string", index))
}

fn int_arg(args: &[Value], index: usize) -> Result<i64, String> {
    args.get(index)
        .and_then(Value::as_int)
        .ok_or_else(|| format!("argument {} is not an int", index))
}

fn char_index(value: i64, length: usize, what: &str) -> Result<usize, String> {
    if value < 0 || value as usize > length {
        return Err(format!("{} {} out of bounds for length {}", what, value, length));
    }
    Ok(value as usize)
}

/// The method definitions exposed for `TypeTag::Str`
pub fn string_methods() -> Vec<MethodDef> {
    use TypeTag::{Int, Str};

    vec![
        MethodDef::new("length", &[Str], |args| {
            Ok(Value::Int(str_arg(args, 0)?.chars().count() as i64))
        }),
        MethodDef::new("is_empty", &[Str], |args| {
            Ok(Value::Bool(str_arg(args, 0)?.is_empty()))
        }),
        MethodDef::new("contains", &[Str, Str], |args| {
            Ok(Value::Bool(str_arg(args, 0)?.contains(str_arg(args, 1)?)))
        }),
        MethodDef::new("starts_with", &[Str, Str], |args| {
            Ok(Value::Bool(
                str_arg(args, 0)?.starts_with(str_arg(args, 1)?),
            ))
        }),
        MethodDef::new("ends_with", &[Str, Str], |args| {
            Ok(Value::Bool(str_arg(args, 0)?.ends_with(str_arg(args, 1)?)))
        }),
        MethodDef::new("equals", &[Str, Str], |args| {
            Ok(Value::Bool(str_arg(args, 0)? == str_arg(args, 1)?))
        }),
        MethodDef::new("equals_ignore_case", &[Str, Str], |args| {
            Ok(Value::Bool(
                str_arg(args, 0)?.to_lowercase() == str_arg(args, 1)?.to_lowercase(),
            ))
        }),
        MethodDef::new("to_lower_case", &[Str], |args| {
            Ok(Value::Str(str_arg(args, 0)?.to_lowercase()))
        }),
        MethodDef::new("to_upper_case", &[Str], |args| {
            Ok(Value::Str(str_arg(args, 0)?.to_uppercase()))
        }),
        MethodDef::new("trim", &[Str], |args| {
            Ok(Value::Str(str_arg(args, 0)?.trim().to_string()))
        }),
        MethodDef::new("substring", &[Str, Int], |args| {
            let receiver = str_arg(args, 0)?;
            let chars: Vec<char> = receiver.chars().collect();
            let start = char_index(int_arg(args, 1)?, chars.len(), "start")?;
            Ok(Value::Str(chars[start..].iter().collect()))
        }),
        MethodDef::new("substring", &[Str, Int, Int], |args| {
            let receiver = str_arg(args, 0)?;
            let chars: Vec<char> = receiver.chars().collect();
            let start = char_index(int_arg(args, 1)?, chars.len(), "start")?;
            let end = char_index(int_arg(args, 2)?, chars.len(), "end")?;
            if start > end {
                return Err(format!("start {} is past end {}", start, end));
            }
            Ok(Value::Str(chars[start..end].iter().collect()))
        }),
        MethodDef::new("char_at", &[Str, Int], |args| {
            let receiver = str_arg(args, 0)?;
            let index = int_arg(args, 1)?;
            receiver
                .chars()
                .nth(index.max(0) as usize)
                .filter(|_| index >= 0)
                .map(|c| Value::Str(c.to_string()))
                .ok_or_else(|| format!("index {} out of bounds", index))
        }),
        MethodDef::new("index_of", &[Str, Str], |args| {
            let receiver = str_arg(args, 0)?;
            let needle = str_arg(args, 1)?;
            let position = receiver
                .find(needle)
                .map(|byte| receiver[..byte].chars().count() as i64)
                .unwrap_or(-1);
            Ok(Value::Int(position))
        }),
        MethodDef::new("replace", &[Str, Str, Str], |args| {
            Ok(Value::Str(
                str_arg(args, 0)?.replace(str_arg(args, 1)?, str_arg(args, 2)?),
            ))
        }),
        MethodDef::new("concat", &[Str, Str], |args| {
            Ok(Value::Str(format!(
                "{}{}",
                str_arg(args, 0)?,
                str_arg(args, 1)?
            )))
        }),
        MethodDef::new("repeat", &[Str, Int], |args| {
            let count = int_arg(args, 1)?;
            if count < 0 {
                return Err(format!("negative repeat count {}", count));
            }
            Ok(Value::Str(str_arg(args, 0)?.repeat(count as usize)))
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MethodRegistry;

    fn call(name: &str, args: Vec<Value>) -> Result<Value, String> {
        let registry = MethodRegistry::with_builtin_strings();
        let kinds: Vec<TypeTag> = args.iter().map(Value::tag).collect();
        let handler = registry
            .find(TypeTag::Str, name, &kinds)
            .map_err(|miss| format!("{:?}", miss))?;
        handler(&args)
    }

    #[test]
    fn test_length_counts_chars() {
        assert_eq!(call("length", vec!["abc".into()]), Ok(Value::Int(3)));
        assert_eq!(call("length", vec!["héllo".into()]), Ok(Value::Int(5)));
    }

    #[test]
    fn test_predicates() {
        assert_eq!(
            call("contains", vec!["warlord".into(), "war".into()]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            call("starts_with", vec!["vip_gold".into(), "vip".into()]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            call("equals_ignore_case", vec!["ABC".into(), "abc".into()]),
            Ok(Value::Bool(true))
        );
        assert_eq!(call("is_empty", vec!["".into()]), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_substring_overloads() {
        assert_eq!(
            call("substring", vec!["abcdef".into(), 2i64.into()]),
            Ok(Value::Str("cdef".into()))
        );
        assert_eq!(
            call("substring", vec!["abcdef".into(), 1i64.into(), 3i64.into()]),
            Ok(Value::Str("bc".into()))
        );
    }

    #[test]
    fn test_bounds_are_invocation_failures() {
        assert!(call("substring", vec!["abc".into(), 9i64.into()]).is_err());
        assert!(call("char_at", vec!["abc".into(), (-1i64).into()]).is_err());
        assert!(call("repeat", vec!["ab".into(), (-2i64).into()]).is_err());
    }

    #[test]
    fn test_index_of() {
        assert_eq!(
            call("index_of", vec!["hello".into(), "llo".into()]),
            Ok(Value::Int(2))
        );
        assert_eq!(
            call("index_of", vec!["hello".into(), "xyz".into()]),
            Ok(Value::Int(-1))
        );
    }
}
