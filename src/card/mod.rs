//! Credit cards and their bill due days.

mod core;

pub use core::{Card, DueDay, create_card, create_card_table, get_cards};
