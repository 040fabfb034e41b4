use serde::Serialize;

use crate::core::CRUDResource;

/// Request actions a resource router dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
}

/// Shapes a resource can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Scalar fields, related rows reduced to their names
    List,
    /// Related rows expanded to their own representation
    Detail,
}

/// How strictly a write view is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Replace,
    Partial,
}

impl WriteMode {
    #[must_use]
    pub const fn requires_all_fields(self) -> bool {
        matches!(self, Self::Create | Self::Replace)
    }
}

impl Action {
    /// View used for the response body; `None` when nothing is returned.
    #[must_use]
    pub const fn view(self) -> Option<View> {
        match self {
            Self::List => Some(View::List),
            Self::Retrieve | Self::Create | Self::Update | Self::PartialUpdate => {
                Some(View::Detail)
            }
            Self::Destroy => None,
        }
    }

    #[must_use]
    pub const fn write_mode(self) -> Option<WriteMode> {
        match self {
            Self::Create => Some(WriteMode::Create),
            Self::Update => Some(WriteMode::Replace),
            Self::PartialUpdate => Some(WriteMode::Partial),
            Self::List | Self::Retrieve | Self::Destroy => None,
        }
    }
}

/// A record rendered in one of its views.
#[derive(Serialize)]
#[serde(untagged, bound(serialize = ""))]
pub enum Representation<T: CRUDResource> {
    List(T::ListModel),
    Detail(T),
}

/// Render a loaded record in the given view.
pub fn render<T: CRUDResource>(record: T::Record, view: View) -> Representation<T> {
    match view {
        View::List => Representation::List(T::ListModel::from(record)),
        View::Detail => Representation::Detail(T::from(record)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_views() {
        assert_eq!(Action::List.view(), Some(View::List));
        assert_eq!(Action::Retrieve.view(), Some(View::Detail));
        assert_eq!(Action::Create.view(), Some(View::Detail));
        assert_eq!(Action::Update.view(), Some(View::Detail));
        assert_eq!(Action::PartialUpdate.view(), Some(View::Detail));
        assert_eq!(Action::Destroy.view(), None);
    }

    #[test]
    fn test_only_writes_have_a_mode() {
        for action in [Action::Create, Action::Update, Action::PartialUpdate] {
            assert!(action.write_mode().is_some());
        }
        for action in [Action::List, Action::Retrieve, Action::Destroy] {
            assert_eq!(action.write_mode(), None);
        }
    }

    #[test]
    fn test_write_modes() {
        assert!(WriteMode::Create.requires_all_fields());
        assert!(WriteMode::Replace.requires_all_fields());
        assert!(!WriteMode::Partial.requires_all_fields());
        assert_eq!(Action::PartialUpdate.write_mode(), Some(WriteMode::Partial));
    }
}
