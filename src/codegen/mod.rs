//! Wrapper generation: type categories, overload planning and template-driven
//! emission.

pub mod category;
pub mod emitter;
pub mod planner;
pub mod templates;

pub use category::{Classification, PrimitiveKind, TypeCategory, TypeIndex};
pub use emitter::{CodeEmitter, EmitOptions, GeneratedFile};
pub use planner::{
    Argument, DispatchError, FunctionPlan, Mismatch, OverloadPlan, OverloadPlanner, PlanOptions,
};
pub use templates::{TemplateContext, TemplateProvider, Templates};
