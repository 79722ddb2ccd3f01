//! Error types for the data model

/// Structural problems detected in a requirement model or plan
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Page references an info item that is not declared
    #[error("page {page_id} references unknown info item {info_item_id}")]
    UnknownInfoItem {
        page_id: String,
        info_item_id: String,
    },

    /// Priority list contains the same item twice
    #[error("page {page_id} lists info item {info_item_id} more than once")]
    DuplicatePriority {
        page_id: String,
        info_item_id: String,
    },

    /// Priorities are not the dense sequence 1..N
    #[error("page {page_id} priorities are not dense 1..{expected}")]
    SparsePriorities { page_id: String, expected: usize },

    /// Priority list does not cover every info item
    #[error("page {page_id} covers {covered} of {expected} info items")]
    IncompletePriorities {
        page_id: String,
        covered: usize,
        expected: usize,
    },

    /// Region ratio outside [0, 1]
    #[error("region {region_id} has ratio {field}={value} outside [0, 1]")]
    RatioOutOfRange {
        region_id: String,
        field: &'static str,
        value: f64,
    },

    /// Placed item bound to a component that is not in the library
    #[error("region {region_id} binds {info_item_id} to unknown component {component_id}")]
    UnknownComponent {
        region_id: String,
        info_item_id: String,
        component_id: String,
    },

    /// Slot binding names a slot the component does not declare
    #[error("component {component_id} declares no slot named {slot_name}")]
    UnknownSlot {
        component_id: String,
        slot_name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_display() {
        let err = ModelError::SparsePriorities {
            page_id: "p1".to_string(),
            expected: 4,
        };
        assert!(err.to_string().contains("dense 1..4"));
    }

    #[test]
    fn ratio_error_compares_by_value() {
        let err = ModelError::RatioOutOfRange {
            region_id: "top".to_string(),
            field: "x",
            value: 1.5,
        };
        assert_eq!(err.clone(), err);
        assert_ne!(
            err,
            ModelError::RatioOutOfRange {
                region_id: "top".to_string(),
                field: "x",
                value: 0.5,
            }
        );
        assert!(err.to_string().contains("x=1.5 outside [0, 1]"));
    }
}
