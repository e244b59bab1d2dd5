use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(ProductId);
id_newtype!(OrderId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Seeds,
    Fertilizers,
    Pesticides,
    Tools,
    Equipment,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Seeds,
        Category::Fertilizers,
        Category::Pesticides,
        Category::Tools,
        Category::Equipment,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Seeds => "Seeds",
            Self::Fertilizers => "Fertilizers",
            Self::Pesticides => "Pesticides",
            Self::Tools => "Tools",
            Self::Equipment => "Equipment",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.label() == s.trim())
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Lifecycle of an order as seen by the seller.
///
/// `Completed` and `Cancelled` are terminal: [`OrderStatus::available_actions`]
/// returns nothing for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Actions offered for an order in this status, in display order.
    pub fn available_actions(self) -> &'static [OrderAction] {
        match self {
            Self::Pending => &[OrderAction::StartProcessing, OrderAction::Cancel],
            Self::Processing => &[OrderAction::MarkComplete, OrderAction::Cancel],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Status reached by applying `action`, or `None` when the edge does not exist.
    pub fn apply(self, action: OrderAction) -> Option<OrderStatus> {
        if self.available_actions().contains(&action) {
            Some(action.target())
        } else {
            None
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderAction {
    StartProcessing,
    MarkComplete,
    Cancel,
}

impl OrderAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::StartProcessing => "Start Processing",
            Self::MarkComplete => "Mark Complete",
            Self::Cancel => "Cancel",
        }
    }

    pub fn target(self) -> OrderStatus {
        match self {
            Self::StartProcessing => OrderStatus::Processing,
            Self::MarkComplete => OrderStatus::Completed,
            Self::Cancel => OrderStatus::Cancelled,
        }
    }
}

/// The three dashboard views, selected by a single active-tab value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    List,
    Products,
    Orders,
}

impl View {
    pub const ALL: [View; 3] = [View::List, View::Products, View::Orders];

    pub fn label(self) -> &'static str {
        match self {
            Self::List => "List Product",
            Self::Products => "Listed Products",
            Self::Orders => "Active Orders",
        }
    }
}
