//! Text command grammar.
//!
//! ```text
//! place two large red chairs and a lamp
//! put a wooden table
//! living room
//! delete the sofa | delete this | clear all
//! move it left by 2
//! ```

use bevy::prelude::*;
use thiserror::Error;

use super::{PlacementRequest, RequestError};
use crate::catalog::{color_from_word, normalize_keyword, size_from_word, MaterialPreset};

/// Upper bound on "N objects" so a typo can't flood the scene
pub const MAX_QUANTITY: usize = 12;

const PLACE_VERBS: &[&str] = &["place", "add", "put", "create", "spawn", "insert", "make", "i", "want", "need"];
const DELETE_VERBS: &[&str] = &["delete", "remove", "destroy"];
const SELF_WORDS: &[&str] = &["it", "this", "that", "selected", "selection", "them"];

const ROOMS: &[(&str, &[&str])] = &[
    ("living room", &["sofa", "tv", "table", "plant"]),
    ("livingroom", &["sofa", "tv", "table", "plant"]),
    ("lounge", &["sofa", "tv", "table", "plant"]),
    ("bedroom", &["bed", "drawer", "lamp", "carpet"]),
    ("office", &["table", "officechair", "computer", "lamp"]),
    ("office room", &["table", "officechair", "computer", "lamp"]),
    ("study", &["table", "officechair", "computer", "lamp"]),
];

/// Which objects a command applies to
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Selected,
    /// Every object with this canonical keyword
    Keyword(String),
}

/// A parsed command
#[derive(Clone, Debug, PartialEq)]
pub enum SceneCommand {
    Place(Vec<PlacementRequest>),
    Delete(Target),
    Clear,
    Move { target: Target, offset: Vec3 },
    /// Voice capture was requested
    Voice,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("which way? try left, right, forward or back")]
    MissingDirection,
}

/// Parse one line of text into a command
pub fn parse_command(text: &str) -> Result<SceneCommand, ParseError> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '_' { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned
        .split_whitespace()
        .map(|w| w.trim_matches('.'))
        .filter(|w| !w.is_empty())
        .collect();
    let Some(first) = words.first() else {
        return Err(ParseError::Empty);
    };

    match *first {
        "voice" | "listen" | "dictate" => Ok(SceneCommand::Voice),
        "clear" | "reset" => Ok(SceneCommand::Clear),
        "move" | "shift" | "nudge" => parse_move(&words[1..]),
        verb if DELETE_VERBS.contains(&verb) => parse_delete(&words[1..]),
        _ => parse_place(&words),
    }
}

fn parse_delete(words: &[&str]) -> Result<SceneCommand, ParseError> {
    let rest: Vec<&str> = words.iter().copied().filter(|w| !matches!(*w, "the" | "all" | "every")).collect();
    if rest.is_empty() || rest.iter().all(|w| SELF_WORDS.contains(w)) {
        return Ok(SceneCommand::Delete(Target::Selected));
    }
    if matches!(rest.as_slice(), ["everything"] | ["scene"]) {
        return Ok(SceneCommand::Clear);
    }
    let phrase = rest.join(" ");
    let keyword = normalize_keyword(&phrase).ok_or(RequestError::EmptyKeyword(phrase))?;
    Ok(SceneCommand::Delete(Target::Keyword(keyword)))
}

fn parse_move(words: &[&str]) -> Result<SceneCommand, ParseError> {
    let mut direction = None;
    let mut distance = 1.0;
    let mut object = Vec::new();
    let mut iter = words.iter().copied().peekable();
    while let Some(word) = iter.next() {
        if let Some(dir) = direction_of(word) {
            direction = Some(dir);
        } else if word == "by" {
            if let Some(n) = iter.peek().and_then(|w| number(w)) {
                distance = n;
                iter.next();
            }
        } else if let Some(n) = number(word).filter(|_| direction.is_some()) {
            distance = n;
        } else if !matches!(word, "to" | "the" | "units" | "unit" | "meters" | "meter" | "m") {
            object.push(word);
        }
    }
    let direction = direction.ok_or(ParseError::MissingDirection)?;

    let target = if object.is_empty() || object.iter().all(|w| SELF_WORDS.contains(w)) {
        Target::Selected
    } else {
        let phrase = object.join(" ");
        Target::Keyword(normalize_keyword(&phrase).ok_or(RequestError::EmptyKeyword(phrase))?)
    };
    Ok(SceneCommand::Move {
        target,
        offset: direction * distance,
    })
}

fn direction_of(word: &str) -> Option<Vec3> {
    match word {
        "left" => Some(Vec3::NEG_X),
        "right" => Some(Vec3::X),
        "forward" | "forwards" | "ahead" => Some(Vec3::NEG_Z),
        "back" | "backward" | "backwards" => Some(Vec3::Z),
        _ => None,
    }
}

fn parse_place(words: &[&str]) -> Result<SceneCommand, ParseError> {
    let start = words.iter().take_while(|w| PLACE_VERBS.contains(w)).count();
    let words = &words[start..];

    let rest: Vec<&str> = words.iter().copied().filter(|w| !matches!(*w, "a" | "an" | "the")).collect();
    let phrase = rest.join(" ");
    if let Some((_, items)) = ROOMS.iter().find(|(room, _)| *room == phrase) {
        let requests = items
            .iter()
            .map(|item| PlacementRequest::keyword(item))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(SceneCommand::Place(requests));
    }

    let mut requests = Vec::new();
    for segment in words.split(|w| matches!(*w, "and" | "plus" | "then")) {
        if segment.is_empty() {
            continue;
        }
        requests.extend(parse_segment(segment)?);
    }
    if requests.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(SceneCommand::Place(requests))
}

/// "[N] [size] [color] [material] object"
fn parse_segment(words: &[&str]) -> Result<Vec<PlacementRequest>, ParseError> {
    let mut quantity = 1;
    let mut color = None;
    let mut scale = None;
    let mut material = None;
    let mut object = Vec::new();

    for word in words {
        if let Some(n) = quantity_of(word).filter(|_| object.is_empty()) {
            quantity = n;
        } else if let Some(s) = size_from_word(word) {
            scale = Some(s);
        } else if let Some(c) = color_from_word(word) {
            color = Some(c);
        } else if let Some(m) = MaterialPreset::from_word(word) {
            material = Some(m);
        } else {
            object.push(*word);
        }
    }

    let request = PlacementRequest::new(&object.join(" "), color, scale, material)?;
    Ok(vec![request; quantity.clamp(1, MAX_QUANTITY)])
}

fn quantity_of(word: &str) -> Option<usize> {
    let n = match word {
        "two" | "pair" | "couple" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        _ => return word.parse().ok().filter(|n| *n > 0),
    };
    Some(n)
}

fn number(word: &str) -> Option<f32> {
    word.parse::<f32>().ok().filter(|n| n.is_finite() && *n > 0.0)
}
