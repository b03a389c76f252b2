//! Parser for class/level cells
//!
//! Grammar, per `|`-separated chunk:
//!
//! ```text
//! chunk    := name [ "(" subclass ")" ] "Level" digits
//! name     := word { word }
//! ```
//!
//! e.g. `fighter (Battle Master) Level 5 | wizard Level 3`. Chunks that do
//! not match are skipped; a cell with nothing parseable has no classes.

use nom::bytes::complete::{tag_no_case, take_until, take_while1};
use nom::character::complete::{char, digit1, multispace0};
use nom::combinator::{map_res, opt};
use nom::multi::many_till;
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};

use crate::data::tokens::slugify;

/// One class entry of a character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLevel {
    pub class: String,
    pub subclass: Option<String>,
    pub level: u32,
}

fn name_word(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace0,
        take_while1(|c: char| c.is_alphabetic() || c == '\'' || c == '-'),
    )
    .parse(input)
}

fn subclass(input: &str) -> IResult<&str, &str> {
    delimited((multispace0, char('(')), take_until(")"), char(')')).parse(input)
}

fn level(input: &str) -> IResult<&str, u32> {
    preceded(
        (multispace0, tag_no_case("level"), multispace0),
        map_res(digit1, str::parse::<u32>),
    )
    .parse(input)
}

fn class_chunk(input: &str) -> IResult<&str, ClassLevel> {
    let (rest, (words, (sub, lvl))) = many_till(name_word, (opt(subclass), level)).parse(input)?;
    let sub = sub.map(str::trim).filter(|s| !s.is_empty()).map(slugify);

    Ok((
        rest,
        ClassLevel {
            class: slugify(&words.join(" ")),
            subclass: sub,
            level: lvl,
        },
    ))
}

/// Parse every class entry in a cell
pub fn parse_classes_field(cell: &str) -> Vec<ClassLevel> {
    cell.split('|')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .filter_map(|chunk| class_chunk(chunk).ok().map(|(_, parsed)| parsed))
        .filter(|parsed| !parsed.class.is_empty())
        .collect()
}

/// Highest-level entry; the first one listed wins on ties
pub fn primary_class(classes: &[ClassLevel]) -> Option<&ClassLevel> {
    classes
        .iter()
        .fold(None, |best: Option<&ClassLevel>, c| match best {
            Some(b) if b.level >= c.level => Some(b),
            _ => Some(c),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiclass() {
        let parsed = parse_classes_field("Fighter (Battle Master) Level 5 | Wizard (War Magic) Level 3");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].class, "fighter");
        assert_eq!(parsed[0].subclass.as_deref(), Some("battle_master"));
        assert_eq!(parsed[0].level, 5);
        assert_eq!(parsed[1].class, "wizard");
        assert_eq!(parsed[1].subclass.as_deref(), Some("war_magic"));
        assert_eq!(parsed[1].level, 3);
    }

    #[test]
    fn test_parse_without_subclass_and_multiword_name() {
        let parsed = parse_classes_field("Blood Hunter level 2");
        assert_eq!(
            parsed,
            vec![ClassLevel {
                class: "blood_hunter".into(),
                subclass: None,
                level: 2
            }]
        );
    }

    #[test]
    fn test_unparseable_chunks_skipped() {
        let parsed = parse_classes_field("??? | Rogue Level 4 | Cleric");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].class, "rogue");
        assert!(parse_classes_field("").is_empty());
    }

    #[test]
    fn test_primary_class_ties_keep_first() {
        let parsed = parse_classes_field("Warlock Level 3 | Sorcerer Level 3 | Bard Level 1");
        assert_eq!(primary_class(&parsed).unwrap().class, "warlock");

        let parsed = parse_classes_field("Warlock Level 2 | Sorcerer Level 6");
        assert_eq!(primary_class(&parsed).unwrap().class, "sorcerer");
        assert!(primary_class(&[]).is_none());
    }
}
