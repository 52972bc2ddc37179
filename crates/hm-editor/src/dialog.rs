//! The record behind the add/edit idea dialog.

use hm_core::id::NodeId;
use hm_core::model::{Color, DEFAULT_TITLE, IdeaNode, NodeData, Position, Shape};

/// Field values as a dialog holds them: keywords are one comma-separated
/// string, text fields are untrimmed user input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdeaForm {
    /// Set when editing an existing node.
    pub id: Option<NodeId>,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub color: Color,
    pub shape: Shape,
    pub image: Option<String>,
    pub position: Option<Position>,
}

impl IdeaForm {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Pre-fill the form for editing `node`.
    pub fn from_node(node: &IdeaNode) -> Self {
        Self {
            id: Some(node.id),
            title: node.title.clone(),
            description: node.description.clone(),
            keywords: node.keywords.join(", "),
            color: node.color,
            shape: node.shape,
            image: node.image.clone(),
            position: Some(node.position),
        }
    }

    pub fn into_data(self) -> NodeData {
        let title = self.title.trim();
        NodeData {
            id: self.id,
            title: if title.is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                title.to_string()
            },
            description: self.description.trim().to_string(),
            keywords: split_keywords(&self.keywords).into(),
            color: self.color,
            shape: self.shape,
            image: self.image.filter(|path| !path.trim().is_empty()),
            position: self.position,
        }
    }
}

/// Split comma-separated keyword input, dropping blank entries.
pub fn split_keywords(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fields_are_trimmed_and_keywords_split() {
        let form = IdeaForm {
            title: "  Bronze  ".into(),
            description: "\tcast in sand\n".into(),
            keywords: " metal, , alloy ,tin,".into(),
            ..IdeaForm::default()
        };
        let data = form.into_data();
        assert_eq!(data.title, "Bronze");
        assert_eq!(data.description, "cast in sand");
        assert_eq!(data.keywords.to_vec(), vec!["metal", "alloy", "tin"]);
        assert_eq!(data.id, None);
    }

    #[test]
    fn blank_title_becomes_untitled() {
        assert_eq!(IdeaForm::titled("   ").into_data().title, "Untitled");
    }

    #[test]
    fn editing_keeps_identity() {
        let mut data = NodeData::titled("Bellows").with_id("form_b");
        data.keywords.push("air".into());
        data.keywords.push("fire".into());
        data.position = Some(Position::new(5.0, 6.0));
        data.image = Some("img/bellows.png".into());
        let node = IdeaNode::from_data(NodeId::intern("form_b"), data.clone());

        let form = IdeaForm::from_node(&node);
        assert_eq!(form.keywords, "air, fire");
        assert_eq!(form.into_data(), data);
    }
}
