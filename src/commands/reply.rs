use super::components::ComponentId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub id: ComponentId,
}

/// What a command sends back: the message, an optional side notice (such
/// as an API budget warning), and any buttons offered with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub body: String,
    pub notice: Option<String>,
    pub buttons: Vec<Button>,
}

impl Reply {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    pub fn with_button(mut self, label: impl Into<String>, id: ComponentId) -> Self {
        self.buttons.push(Button {
            label: label.into(),
            id,
        });
        self
    }

    /// Plain-text rendering for line-oriented front ends.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(notice) = &self.notice {
            out.push_str(notice);
            out.push('\n');
        }
        out.push_str(&self.body);
        if !self.buttons.is_empty() {
            out.push('\n');
            for button in &self.buttons {
                out.push_str(&format!("\n  [{}] !press {}", button.label, button.id));
            }
        }
        out
    }
}
