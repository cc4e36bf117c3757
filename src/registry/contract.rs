//! Framework Callable Contract
//!
//! The six operations this adapter binds to the framework dispatcher. Each
//! identifier is a (generic-id, implementation-id) pair; the string values
//! are framework-defined constants and are consumed unchanged.

/// A (generic-id, implementation-id) pair registered with the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallableId {
    pub genericable_id: &'static str,
    pub fitable_id: &'static str,
}

pub const REGISTER_FIT_SERVICE: CallableId = CallableId {
    genericable_id: "modelengine.fit.service.registry.register-fit-service",
    fitable_id: "nacos-registry-register-fit-service",
};

pub const UNREGISTER_FIT_SERVICE: CallableId = CallableId {
    genericable_id: "modelengine.fit.service.registry.unregister-fit-service",
    fitable_id: "nacos-registry-unregister-fit-service",
};

pub const QUERY_FIT_SERVICE: CallableId = CallableId {
    genericable_id: "modelengine.fit.service.registry.query-fit-service",
    fitable_id: "nacos-registry-query-fit-service",
};

pub const SUBSCRIBE_FIT_SERVICE: CallableId = CallableId {
    genericable_id: "modelengine.fit.service.registry.subscribe-fit-service",
    fitable_id: "nacos-registry-subscribe-fit-service",
};

pub const UNSUBSCRIBE_FIT_SERVICE: CallableId = CallableId {
    genericable_id: "modelengine.fit.service.registry.unsubscribe-fit-service",
    fitable_id: "nacos-registry-unsubscribe-fit-service",
};

pub const QUERY_FITABLE_METAS: CallableId = CallableId {
    genericable_id: "modelengine.fit.service.registry.query-fitable-metas",
    fitable_id: "nacos-registry-query-fitable-metas",
};

/// All callables this adapter exposes, in registration order
pub const ALL_CALLABLES: [CallableId; 6] = [
    REGISTER_FIT_SERVICE,
    UNREGISTER_FIT_SERVICE,
    QUERY_FIT_SERVICE,
    SUBSCRIBE_FIT_SERVICE,
    UNSUBSCRIBE_FIT_SERVICE,
    QUERY_FITABLE_METAS,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_callable_ids_are_distinct() {
        let genericables: HashSet<_> = ALL_CALLABLES.iter().map(|c| c.genericable_id).collect();
        let fitables: HashSet<_> = ALL_CALLABLES.iter().map(|c| c.fitable_id).collect();

        assert_eq!(genericables.len(), ALL_CALLABLES.len());
        assert_eq!(fitables.len(), ALL_CALLABLES.len());
    }
}
