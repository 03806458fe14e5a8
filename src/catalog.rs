//! Static character registry.
//!
//! Each theme is a fixed table of display items; character ids are formed
//! deterministically as `"{category}-{position}"` and stay stable for the
//! lifetime of a set.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::CharacterId;

/// Characters drawn per set
pub const SET_SIZE: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Character {
    pub id: CharacterId,
    pub emoji: String,
    pub name: String,
}

pub const CATEGORIES: &[(&str, &[(&str, &str)])] = &[
    (
        "animals",
        &[
            ("🐶", "Dog"),
            ("🐱", "Cat"),
            ("🦊", "Fox"),
            ("🐻", "Bear"),
            ("🐼", "Panda"),
            ("🐨", "Koala"),
            ("🐯", "Tiger"),
            ("🦁", "Lion"),
            ("🐵", "Monkey"),
            ("🦄", "Unicorn"),
            ("🐷", "Pig"),
            ("🐸", "Frog"),
            ("🐔", "Chicken"),
            ("🦆", "Duck"),
            ("🦉", "Owl"),
            ("🦓", "Zebra"),
            ("🦒", "Giraffe"),
            ("🐘", "Elephant"),
            ("🐹", "Hamster"),
            ("🐰", "Rabbit"),
        ],
    ),
    (
        "players",
        &[
            ("🧔", "Alex"),
            ("👩‍🦱", "Mia"),
            ("👨‍🦰", "Leo"),
            ("👩‍🦳", "Sophia"),
            ("👨‍🦲", "Victor"),
            ("👩‍🦰", "Emma"),
            ("🧑‍🦰", "Noah"),
            ("🧑‍🦱", "Ava"),
            ("🧑‍🦲", "Zane"),
            ("🧔‍♂️", "Chris"),
            ("👩", "Lara"),
            ("👨", "Ryan"),
            ("👩‍🦰", "Ella"),
            ("👩‍🦲", "Nina"),
            ("🧔‍♂️", "Mark"),
            ("👩‍🦳", "Iris"),
            ("👨‍🦱", "Ethan"),
            ("👩‍🦱", "Ruby"),
            ("👨‍🦰", "Owen"),
            ("👩‍🦰", "Maya"),
        ],
    ),
    (
        "celebrities",
        &[
            ("🎤", "Singer"),
            ("🎬", "Actor"),
            ("⚽", "Footballer"),
            ("🏀", "Hooper"),
            ("🎧", "DJ"),
            ("🎻", "Violinist"),
            ("🎸", "Guitarist"),
            ("🎹", "Pianist"),
            ("🏎️", "Racer"),
            ("🏊", "Swimmer"),
            ("🏏", "Cricketer"),
            ("🤹", "Performer"),
            ("🎮", "Streamer"),
            ("📰", "Host"),
            ("📚", "Author"),
            ("🧪", "Scientist"),
            ("🏈", "Quarterback"),
            ("🎯", "Archer"),
            ("🥊", "Boxer"),
            ("🤡", "Comedian"),
        ],
    ),
];

pub fn pick_random_category() -> &'static str {
    let mut rng = rand::rng();
    CATEGORIES[rng.random_range(0..CATEGORIES.len())].0
}

fn items_for(category: &str) -> &'static [(&'static str, &'static str)] {
    CATEGORIES
        .iter()
        .find(|(key, _)| *key == category)
        .map(|(_, items)| *items)
        .unwrap_or(&[])
}

/// Build the character list for a set, repeating items if the theme is
/// smaller than the requested size.
pub fn build_characters(category: &str, size: usize) -> Vec<Character> {
    let items = items_for(category);
    if items.is_empty() {
        return Vec::new();
    }

    items
        .iter()
        .cycle()
        .take(size)
        .enumerate()
        .map(|(i, (emoji, name))| Character {
            id: format!("{}-{}", category, i + 1),
            emoji: (*emoji).to_string(),
            name: (*name).to_string(),
        })
        .collect()
}
