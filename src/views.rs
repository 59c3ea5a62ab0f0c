use serde::Serialize;

use crate::resolver::Resolver;
use crate::types::ResolvedDraw;
use crate::utils::{invalid_search_message, not_found_message, parse_draw_number};

/// What a surface renders: a resolved draw, or nothing plus a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawPage {
    pub draw: Option<ResolvedDraw>,
    pub message: Option<String>,
}

impl DrawPage {
    pub fn found(draw: ResolvedDraw) -> Self {
        Self {
            draw: Some(draw),
            message: None,
        }
    }

    pub fn empty(message: String) -> Self {
        Self {
            draw: None,
            message: Some(message),
        }
    }

    pub fn is_found(&self) -> bool {
        self.draw.is_some()
    }
}

impl Resolver {
    pub async fn show_latest(&self) -> DrawPage {
        self.page(None).await
    }

    pub async fn show_by_number(&self, number: u32) -> DrawPage {
        self.page(Some(number)).await
    }

    /// Number search from free-text input; a valid number is shown exactly as
    /// [`Resolver::show_by_number`] would.
    pub async fn search(&self, input: &str) -> DrawPage {
        match parse_draw_number(input) {
            Some(number) => self.show_by_number(number).await,
            None => DrawPage::empty(invalid_search_message(input)),
        }
    }

    async fn page(&self, number: Option<u32>) -> DrawPage {
        match self.resolve(number).await {
            Some(draw) => DrawPage::found(draw),
            None => DrawPage::empty(not_found_message(number)),
        }
    }
}
