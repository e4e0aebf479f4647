//! Pure rendering of [`LotteryState`] into a view tree, and of the tree into HTML.

use std::fmt::Write as _;

use super::state::LotteryState;

/// Markup variant. Both render the same content; only structure and classes differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Theme {
    /// Centered Bootstrap card.
    #[default]
    Card,
    /// Unstyled markup.
    Plain,
}

/// A node of the rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNode {
    Element {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
        children: Vec<ViewNode>,
    },
    Text(String),
}

impl ViewNode {
    fn el(tag: &'static str, children: Vec<ViewNode>) -> Self {
        ViewNode::Element {
            tag,
            attrs: Vec::new(),
            children,
        }
    }

    fn text(s: impl Into<String>) -> Self {
        ViewNode::Text(s.into())
    }

    fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let ViewNode::Element { ref mut attrs, .. } = self {
            attrs.push((name, value.into()));
        }
        self
    }

    /// Add a `class` attribute, but only for the card theme.
    fn styled(self, theme: Theme, class: &str) -> Self {
        match theme {
            Theme::Card => self.attr("class", class),
            Theme::Plain => self,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            ViewNode::Text(s) => out.push_str(s),
            ViewNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Serialize to HTML, escaping text and attribute values.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            ViewNode::Text(s) => out.push_str(&escape(s)),
            ViewNode::Element {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    let _ = write!(out, " {}=\"{}\"", name, escape(value));
                }
                out.push('>');
                if is_void(tag) {
                    return;
                }
                for child in children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", tag);
            }
        }
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "input" | "meta" | "link")
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the lottery view. Same state and theme always give the same tree.
pub fn render(state: &LotteryState, theme: Theme) -> ViewNode {
    let players = ViewNode::el(
        "ul",
        state
            .players
            .iter()
            .map(|p| ViewNode::el("li", vec![ViewNode::text(p.as_str())]))
            .collect(),
    )
    .attr("id", "players");

    let summary = ViewNode::el(
        "p",
        vec![
            ViewNode::text("There are currently "),
            ViewNode::el("span", vec![ViewNode::text(state.total_players.as_str())])
                .attr("id", "total-players"),
            ViewNode::text(" players, competing for "),
            ViewNode::el("span", vec![ViewNode::text(state.display_balance())])
                .attr("id", "balance"),
            ViewNode::text(" ethereum! The current winner is: "),
            ViewNode::el("span", vec![ViewNode::text(state.winner.as_str())]).attr("id", "winner"),
            ViewNode::el("br", vec![]),
            ViewNode::text("Current players entered: "),
            players,
        ],
    )
    .styled(theme, "card-text");

    let input = ViewNode::el("input", vec![])
        .attr("type", "number")
        .attr("step", "any")
        .attr("min", "0")
        .attr("name", "entryValue")
        .attr("id", "entry-value")
        .attr("placeholder", "Amount of ether to enter")
        .attr("value", state.entry_value.as_str())
        .styled(theme, "w-25 p-1 mx-auto text-center form-control");

    let form = ViewNode::el(
        "form",
        vec![
            ViewNode::el("h4", vec![ViewNode::text("Want to try your luck? (minimum of $10)")]),
            ViewNode::el("div", vec![input]),
            ViewNode::el("br", vec![]),
            ViewNode::el("button", vec![ViewNode::text("Enter")])
                .attr("type", "submit")
                .styled(theme, "btn btn-dark"),
        ],
    )
    .attr("method", "post")
    .attr("action", "/enter");

    let status_tag = match theme {
        Theme::Card => "h1",
        Theme::Plain => "p",
    };
    let status = ViewNode::el(
        "div",
        vec![ViewNode::el(status_tag, vec![ViewNode::text(state.entry_message.to_string())])],
    )
    .attr("id", "entry-message");

    ViewNode::el(
        "div",
        vec![
            ViewNode::el("h2", vec![ViewNode::text("Lottery Contract")])
                .styled(theme, "card-title"),
            summary,
            ViewNode::el("hr", vec![]),
            form,
            ViewNode::el("hr", vec![]),
            status,
        ],
    )
    .attr("id", "lottery")
    .styled(theme, CARD_CLASSES)
}

const CARD_CLASSES: &str = "col-md-3 w-50 mx-auto text-center position-absolute top-50 start-50 \
     translate-middle card card-body text-bg-secondary mb-3";

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

/// Reload the page when a submission changes the status line. Loads are not
/// followed, since every page load triggers one. The snapshot sent on connect
/// covers changes made between rendering and the socket opening.
const LIVE_RELOAD_SCRIPT: &str = r#"(() => {
  const proto = location.protocol === "https:" ? "wss" : "ws";
  const ws = new WebSocket(`${proto}://${location.host}/ws`);
  ws.onmessage = (msg) => {
    const event = JSON.parse(msg.data);
    if (event.type === "lottery:snapshot") {
      const shown = document.getElementById("entry-message").textContent;
      if (shown !== event.state.entryMessage) {
        location.reload();
      }
    } else if (["entry:pending", "entry:succeeded", "entry:failed"].includes(event.type)) {
      location.reload();
    }
  };
})();"#;

/// Full HTML document around the rendered view.
pub fn render_page(state: &LotteryState, theme: Theme) -> String {
    let mut head = String::from("<meta charset=\"utf-8\"><title>Lottery</title>");
    if theme == Theme::Card {
        let _ = write!(head, "<link rel=\"stylesheet\" href=\"{}\">", BOOTSTRAP_CSS);
    }

    format!(
        "<!DOCTYPE html><html><head>{}</head><body>{}<script>{}</script></body></html>",
        head,
        render(state, theme).to_html(),
        LIVE_RELOAD_SCRIPT
    )
}
