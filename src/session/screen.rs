//! What a state puts in front of the user
//!
//! A `Screen` is plain data. `reporters::text` turns it into terminal
//! commands, and tests inspect it directly.

use crate::reporters::bar::BarChart;

/// A bar with its caption and axis labels
#[derive(Debug, Clone, PartialEq)]
pub struct BarPanel {
    pub caption: String,
    pub chart: BarChart,
    pub max_label: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Possibly multi-line text
    Text(String),
    /// Numbered options, starting at 1
    Menu(Vec<String>),
    Bar(BarPanel),
    Blank,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Screen {
    /// Heading, drawn after the status line when there is one
    pub title: String,
    /// First line, above the title, e.g. the logged in user
    pub status: Option<String>,
    pub blocks: Vec<Block>,
    /// Validation or confirmation message from the last input
    pub notice: Option<String>,
    /// Text left in front of the cursor
    pub prompt: String,
}

impl Screen {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Text(text.into()));
        self
    }

    pub fn blank(mut self) -> Self {
        self.blocks.push(Block::Blank);
        self
    }

    pub fn menu<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocks
            .push(Block::Menu(items.into_iter().map(Into::into).collect()));
        self
    }

    pub fn bar(mut self, panel: BarPanel) -> Self {
        self.blocks.push(Block::Bar(panel));
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    /// All bars on the screen, top to bottom
    pub fn bars(&self) -> Vec<&BarPanel> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Bar(panel) => Some(panel),
                _ => None,
            })
            .collect()
    }

    /// Menu entries, if the screen offers a menu
    pub fn menu_items(&self) -> Option<&[String]> {
        self.blocks.iter().find_map(|b| match b {
            Block::Menu(items) => Some(items.as_slice()),
            _ => None,
        })
    }

    /// Everything readable on the screen joined by newlines
    pub fn plain_text(&self) -> String {
        let mut lines = vec![self.title.clone()];
        lines.extend(self.status.clone());
        for block in &self.blocks {
            match block {
                Block::Text(text) => lines.push(text.clone()),
                Block::Menu(items) => lines.extend(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| format!("{}. {}", i + 1, item)),
                ),
                Block::Bar(panel) => lines.push(panel.caption.clone()),
                Block::Blank => lines.push(String::new()),
            }
        }
        lines.extend(self.notice.clone());
        lines.push(self.prompt.clone());
        lines.join("\n")
    }
}
