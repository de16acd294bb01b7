mod sla_reconciler;

pub use sla_reconciler::{ReconciliationPlan, SlaReconciler};
