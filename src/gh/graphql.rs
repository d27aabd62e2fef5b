//! GraphQL documents sent through `gh api graphql` plus the response shapes
//! we pick values out of. Projects-v2 field values come back as a union, so
//! every member's value key is modeled as an optional field.

use serde::Deserialize;

/// Placeholder rendered for absent or unfetchable values.
pub const PLACEHOLDER: &str = "-";

/// Field values of the first project item attached to a PR.
pub const PROJECT_FIELDS_QUERY: &str = r#"query($PR_NODE_ID: ID!) {
  node(id: $PR_NODE_ID) {
    ... on PullRequest {
      projectItems(first: 1) {
        nodes {
          fieldValues(first: 20) {
            nodes {
              __typename
              ... on ProjectV2ItemFieldSingleSelectValue {
                field { ... on ProjectV2FieldCommon { name } }
                name
              }
              ... on ProjectV2ItemFieldTextValue {
                field { ... on ProjectV2FieldCommon { name } }
                text
              }
              ... on ProjectV2ItemFieldDateValue {
                field { ... on ProjectV2FieldCommon { name } }
                date
              }
              ... on ProjectV2ItemFieldIterationValue {
                field { ... on ProjectV2FieldCommon { name } }
                title
              }
              ... on ProjectV2ItemFieldNumberValue {
                field { ... on ProjectV2FieldCommon { name } }
                number
              }
              ... on ProjectV2ItemFieldMilestoneValue {
                field { ... on ProjectV2FieldCommon { name } }
                milestone { title }
              }
            }
          }
        }
      }
    }
  }
}"#;

/// Project item id, owning project id, and the Status single-select field
/// with its options, for the sync mutations.
pub const SYNC_ITEM_QUERY: &str = r#"query($PR_NODE_ID: ID!) {
  node(id: $PR_NODE_ID) {
    ... on PullRequest {
      projectItems(first: 1) {
        nodes {
          id
          project {
            id
            field(name: "Status") {
              ... on ProjectV2SingleSelectField {
                id
                options { id name }
              }
            }
          }
        }
      }
    }
  }
}"#;

pub const USER_ID_QUERY: &str = r#"query($LOGIN: String!) {
  user(login: $LOGIN) { id }
}"#;

pub const UPDATE_STATUS_MUTATION: &str = r#"mutation($PROJECT_ID: ID!, $ITEM_ID: ID!, $FIELD_ID: ID!, $OPTION_ID: String!) {
  updateProjectV2ItemFieldValue(input: {
    projectId: $PROJECT_ID,
    itemId: $ITEM_ID,
    fieldId: $FIELD_ID,
    value: { singleSelectOptionId: $OPTION_ID }
  }) {
    projectV2Item { id }
  }
}"#;

pub const ADD_ASSIGNEE_MUTATION: &str = r#"mutation($ASSIGNABLE_ID: ID!, $ASSIGNEE_ID: ID!) {
  addAssigneesToAssignable(input: {
    assignableId: $ASSIGNABLE_ID,
    assigneeIds: [$ASSIGNEE_ID]
  }) {
    assignable { ... on PullRequest { id } }
  }
}"#;

#[derive(Debug, Deserialize)]
pub struct NodeList<T> {
    #[serde(default)]
    pub nodes: Vec<T>,
}

impl<T> Default for NodeList<T> {
    fn default() -> Self {
        NodeList { nodes: Vec::new() }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectFieldsResponse {
    pub data: Option<ProjectFieldsData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectFieldsData {
    pub node: Option<ProjectFieldsNode>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectFieldsNode {
    #[serde(default, rename = "projectItems")]
    pub project_items: NodeList<ProjectItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectItem {
    #[serde(default, rename = "fieldValues")]
    pub field_values: NodeList<FieldValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FieldValue {
    pub field: Option<FieldRef>,
    pub text: Option<String>,
    pub date: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub number: Option<f64>,
    pub milestone: Option<Milestone>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FieldRef {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Milestone {
    pub title: Option<String>,
}

impl FieldValue {
    /// Render this union member's value, trying each value key in turn.
    /// Empty strings count as absent.
    fn render(&self) -> Option<String> {
        let text = [&self.text, &self.date, &self.name, &self.title]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty());
        if let Some(s) = text {
            return Some(s.clone());
        }
        if let Some(n) = self.number {
            return Some(format_number(n));
        }
        self.milestone
            .as_ref()
            .and_then(|m| m.title.clone())
            .filter(|t| !t.is_empty())
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Pull the wanted field values out of a project-fields response, in the
/// order of `fields`. Missing fields stay at the placeholder.
pub fn extract_fields(response: &ProjectFieldsResponse, fields: &[String]) -> Vec<String> {
    let mut values = vec![PLACEHOLDER.to_string(); fields.len()];
    let Some(node) = response.data.as_ref().and_then(|d| d.node.as_ref()) else {
        return values;
    };
    for item in &node.project_items.nodes {
        for fv in &item.field_values.nodes {
            let Some(name) = fv.field.as_ref().and_then(|f| f.name.as_deref()) else {
                continue;
            };
            let Some(idx) = fields.iter().position(|f| f == name) else {
                continue;
            };
            if let Some(value) = fv.render() {
                values[idx] = value;
            }
        }
    }
    values
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncItemResponse {
    pub data: Option<SyncItemData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncItemData {
    pub node: Option<SyncItemNode>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncItemNode {
    #[serde(default, rename = "projectItems")]
    pub project_items: NodeList<SyncItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncItem {
    pub id: Option<String>,
    pub project: Option<SyncProject>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncProject {
    pub id: Option<String>,
    pub field: Option<StatusField>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusField {
    pub id: Option<String>,
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserIdResponse {
    pub data: Option<UserIdData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserIdData {
    pub user: Option<UserIdNode>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserIdNode {
    pub id: Option<String>,
}
