//! Ranked summaries produced by the sales analyzer.

use serde::{Deserialize, Serialize};

/// Number of distinct sales of one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPurchases {
    pub customer_id: String,
    pub purchases: u64,
}

/// Purchase-frequency ranking with the dataset totals shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRanking {
    /// Most frequent buyers, count descending then id ascending
    pub top_customers: Vec<CustomerPurchases>,
    /// Distinct customer ids in the customers table
    pub total_customers: u64,
    /// Distinct sale ids in the sales table
    pub total_sales: u64,
}

impl CustomerRanking {
    /// Purchases of a customer, if it made the ranking.
    pub fn purchases_of(&self, customer_id: &str) -> Option<u64> {
        self.top_customers
            .iter()
            .find(|entry| entry.customer_id == customer_id)
            .map(|entry| entry.purchases)
    }

    /// Position (0-based) of a customer in the ranking.
    pub fn position_of(&self, customer_id: &str) -> Option<usize> {
        self.top_customers
            .iter()
            .position(|entry| entry.customer_id == customer_id)
    }
}

/// Number of distinct sales paid with one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodCount {
    pub payment_method: String,
    pub sales: u64,
}

/// Every payment method, count descending then method ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentMethodRanking {
    pub methods: Vec<PaymentMethodCount>,
}

impl PaymentMethodRanking {
    /// The most used method.
    pub fn top(&self) -> Option<&PaymentMethodCount> {
        self.methods.first()
    }

    /// Sales of a method, if present.
    pub fn sales_of(&self, method: &str) -> Option<u64> {
        self.methods
            .iter()
            .find(|entry| entry.payment_method == method)
            .map(|entry| entry.sales)
    }

    /// Sum of the per-method counts.
    pub fn total_sales(&self) -> u64 {
        self.methods.iter().map(|entry| entry.sales).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_lookup() {
        let ranking = CustomerRanking {
            top_customers: vec![
                CustomerPurchases {
                    customer_id: "7".to_string(),
                    purchases: 4,
                },
                CustomerPurchases {
                    customer_id: "3".to_string(),
                    purchases: 2,
                },
            ],
            total_customers: 10,
            total_sales: 12,
        };
        assert_eq!(ranking.purchases_of("3"), Some(2));
        assert_eq!(ranking.position_of("7"), Some(0));
        assert_eq!(ranking.purchases_of("99"), None);
    }

    #[test]
    fn test_payment_totals() {
        let ranking = PaymentMethodRanking {
            methods: vec![
                PaymentMethodCount {
                    payment_method: "tarjeta".to_string(),
                    sales: 5,
                },
                PaymentMethodCount {
                    payment_method: "qr".to_string(),
                    sales: 2,
                },
            ],
        };
        assert_eq!(ranking.top().unwrap().payment_method, "tarjeta");
        assert_eq!(ranking.total_sales(), 7);
        assert_eq!(ranking.sales_of("qr"), Some(2));
        assert!(PaymentMethodRanking::default().top().is_none());
    }
}
