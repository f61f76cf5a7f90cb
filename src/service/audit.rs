use crate::context::RequestContext;
use crate::types::{RecordId, User};

pub(crate) const AUDIT_TARGET: &str = "recordlite::audit";

/// One line per accepted write on the audit target.
pub(crate) fn log_audit(op: &str, id: RecordId, user: &User, ctx: &RequestContext) {
    log::info!(
        target: AUDIT_TARGET,
        "op={op} id={id} user={} request={}",
        user.username,
        ctx.request_id
    );
}

pub(crate) fn log_rejected(op: &str, id: &str, reason: &str, ctx: &RequestContext) {
    log::warn!(target: AUDIT_TARGET, "op={op} id={id} rejected={reason} request={}", ctx.request_id);
}
