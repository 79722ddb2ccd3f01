//! Keyword semantics of information items
//!
//! Classifies items as safety/alert, KPI-like, or contextual, and assigns the
//! per-item weights the normalizer and objective functions share.

use panel_model::{DataType, InfoItem};

/// Signals that an item concerns alarms or safety
pub const ALERT_KEYWORDS: &[&str] = &[
    "alert", "alarm", "safety", "warning", "fault", "emergency", "critical", "danger", "告警",
    "报警", "安全", "预警", "故障", "异常", "紧急",
];

/// Signals that an item is a key performance indicator
pub const KPI_KEYWORDS: &[&str] = &[
    "kpi", "rate", "ratio", "total", "throughput", "utilization", "efficiency", "yield",
    "availability", "指标", "总", "率", "产量", "效率",
];

/// Signals that an item is background context
pub const CONTEXT_KEYWORDS: &[&str] = &[
    "note", "remark", "description", "context", "log", "history", "comment", "备注", "说明",
    "日志", "记录", "历史",
];

const ALERT_SCORE: i32 = 100;
const KPI_SCORE: i32 = 50;
const CONTEXT_SCORE: i32 = -40;

/// Derived semantic view of one info item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemProfile {
    pub id: String,
    pub name: String,
    pub data_type: DataType,
    pub alert: bool,
    pub kpi: bool,
    pub contextual: bool,
}

impl ItemProfile {
    /// Classify an item
    #[must_use]
    pub fn of(item: &InfoItem) -> Self {
        let text = item.search_text();
        let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));
        let alert = item.data_type == DataType::Alert || mentions(ALERT_KEYWORDS);
        let kpi = !alert && mentions(KPI_KEYWORDS);
        let contextual = item.data_type == DataType::Text || mentions(CONTEXT_KEYWORDS);
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            data_type: item.data_type,
            alert,
            kpi,
            contextual,
        }
    }

    /// Default-ranking score (higher ranks earlier)
    #[must_use]
    pub fn semantic_score(&self) -> i32 {
        let mut score = match self.data_type {
            DataType::Alert => 30,
            DataType::Numeric => 20,
            DataType::State | DataType::Trend => 15,
            DataType::Map => 8,
            DataType::List => 6,
            DataType::Text => 0,
        };
        if self.alert {
            score += ALERT_SCORE;
        }
        if self.kpi {
            score += KPI_SCORE;
        }
        if self.contextual {
            score += CONTEXT_SCORE;
        }
        score
    }

    /// Weight in the importance-weighted density objective
    #[must_use]
    pub fn importance(&self) -> f64 {
        if self.alert {
            3.0
        } else if self.kpi {
            2.0
        } else {
            1.0
        }
    }

    /// Screen load the item adds when promoted
    #[must_use]
    pub fn display_load(&self) -> f64 {
        match self.data_type {
            DataType::Map | DataType::List => 1.0,
            DataType::Trend => 0.8,
            DataType::Text => 0.6,
            DataType::Alert => 0.5,
            DataType::State | DataType::Numeric => 0.3,
        }
    }

    /// Reading effort the item demands
    #[must_use]
    pub fn reading_load(&self) -> f64 {
        match self.data_type {
            DataType::Text => 1.0,
            DataType::List => 0.9,
            DataType::Map => 0.7,
            DataType::Trend => 0.5,
            DataType::Alert => 0.3,
            DataType::State | DataType::Numeric => 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_by_type_or_keyword() {
        let typed = ItemProfile::of(&InfoItem::new("a", "Feed", DataType::Alert));
        let named = ItemProfile::of(&InfoItem::new("b", "Safety interlock", DataType::State));
        let tagged = ItemProfile::of(
            &InfoItem::new("c", "Pump 3", DataType::State).with_tags(["报警"]),
        );
        assert!(typed.alert && named.alert && tagged.alert);
    }

    #[test]
    fn kpi_excludes_alerts() {
        let profile = ItemProfile::of(&InfoItem::new("a", "Alarm rate", DataType::Alert));
        assert!(profile.alert);
        assert!(!profile.kpi);
    }

    #[test]
    fn contextual_items_score_low() {
        let note = ItemProfile::of(&InfoItem::new("n", "Shift notes", DataType::Text));
        let kpi = ItemProfile::of(&InfoItem::new("k", "Throughput", DataType::Numeric));
        assert!(note.contextual);
        assert!(kpi.semantic_score() > note.semantic_score());
    }
}
