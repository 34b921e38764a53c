//! Path to screen resolution for each gate state.
//!
//! `/onboarding` and `/subscription` resolve in every state. Everything else
//! depends on the screen set of the current [`GateState`].

use serde::{Deserialize, Serialize};

use crate::gate::{GateState, ScreenSet};

/// What the reader screen was opened on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReaderTarget {
    Book(String),
    Summary(String),
}

/// A screen the client can render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Landing,
    Home,
    Reader { target: ReaderTarget },
    BigIdea { id: String },
    Search,
    Library,
    Profile,
    ContentManager,
    Onboarding,
    Subscription,
    NotFound,
}

/// Resolve `path` for the given state.
///
/// Returns `None` when the state has no catch-all and nothing matched.
pub fn resolve(state: GateState, path: &str) -> Option<Screen> {
    let segments = segments(path);

    match segments.as_slice() {
        ["onboarding"] => return Some(Screen::Onboarding),
        ["subscription"] => return Some(Screen::Subscription),
        _ => {}
    }

    match state.screen_set() {
        ScreenSet::OnboardingOnly => Some(Screen::Onboarding),
        ScreenSet::LandingOnly => match segments.as_slice() {
            [] => Some(Screen::Landing),
            _ if state.has_catch_all() => Some(Screen::NotFound),
            _ => None,
        },
        ScreenSet::FullApp => Some(full_app(&segments).unwrap_or(Screen::NotFound)),
    }
}

fn full_app(segments: &[&str]) -> Option<Screen> {
    let screen = match segments {
        [] => Screen::Home,
        ["book", id] if !id.is_empty() => Screen::Reader {
            target: ReaderTarget::Book(id.to_string()),
        },
        ["summary", id] if !id.is_empty() => Screen::Reader {
            target: ReaderTarget::Summary(id.to_string()),
        },
        ["big-idea", id] if !id.is_empty() => Screen::BigIdea { id: id.to_string() },
        ["search"] => Screen::Search,
        ["library"] => Screen::Library,
        ["profile"] => Screen::Profile,
        ["admin", "content"] | ["content-manager"] => Screen::ContentManager,
        _ => return None,
    };
    Some(screen)
}

/// Split a path into segments, ignoring query, fragment and a trailing slash.
fn segments(path: &str) -> Vec<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Vec::new();
    }
    match trimmed.strip_prefix('/') {
        Some(rest) => rest.split('/').collect(),
        None => vec![""],
    }
}
