//! The representative statements probed on every tick
//!
//! These are configuration, not logic: any statements with a plannable
//! explain output can stand in for them.

use crate::metrics::QueryKind;

/// A fixed statement the monitor probes each tick
#[derive(Debug, Clone, Copy)]
pub struct ProbeSpec {
    pub kind: QueryKind,
    pub statement: &'static str,
}

const READ_STATEMENT: &str = "\
SELECT c.name, SUM(o.amount) \
FROM customers c \
JOIN orders o ON c.id = o.customer_id \
WHERE o.order_date > '2024-01-01' \
GROUP BY c.name";

const WRITE_STATEMENT: &str = "\
INSERT INTO orders (customer_id, amount, order_date) \
VALUES (FLOOR(RAND()*10000), RAND()*1000, CURDATE())";

const UPDATE_STATEMENT: &str = "\
UPDATE customers SET email = CONCAT(name, '@new_domain.com') \
WHERE id IN (SELECT customer_id FROM orders WHERE amount > 500)";

/// The read, write, and update probes in the order they run each tick
pub fn workload() -> [ProbeSpec; 3] {
    [
        ProbeSpec {
            kind: QueryKind::Read,
            statement: READ_STATEMENT,
        },
        ProbeSpec {
            kind: QueryKind::Write,
            statement: WRITE_STATEMENT,
        },
        ProbeSpec {
            kind: QueryKind::Update,
            statement: UPDATE_STATEMENT,
        },
    ]
}
