//! Call-variant planning for overloaded functions.
//!
//! Every overload gets one block per acceptable argument count, from its
//! required count up to its full parameter count. Overloads are tried in
//! declaration order: a mismatch in one hands over to the next, and only the
//! last overload turns a mismatch into an error.

use std::fmt;

use thiserror::Error;
use wrapgen_symbols::{Function, Overload, OverloadFlags, Parameter, TypeDescriptor};

use super::category::{PrimitiveKind, TypeCategory, TypeIndex};
use crate::warnings::{DataQualityWarning, WarningLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    /// Pointer-typed object parameters accept null.
    pub nullable_object_pointers: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            nullable_object_pointers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterPlan {
    pub position: usize,
    pub name: String,
    /// Declaration text as documented.
    pub declaration: String,
    pub category: TypeCategory,
    /// Object parameters must have their native handle extracted.
    pub requires_handle: bool,
    /// A null handle is accepted rather than rejected.
    pub nullable: bool,
    pub default_value: String,
}

impl ParameterPlan {
    pub fn fragment(&self) -> String {
        format!("parameter_{}", self.category.fragment_suffix())
    }

    fn accepts(&self, argument: &Argument) -> bool {
        match argument {
            Argument::Null => self.requires_handle && self.nullable,
            Argument::Value(category) => category_accepts(&self.category, category),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPlan {
    pub declaration: String,
    pub category: TypeCategory,
    /// The call populates a new host object's handle instead of returning.
    pub is_constructor: bool,
}

impl ReturnPlan {
    pub fn fragment(&self) -> String {
        if self.is_constructor {
            "return_constructor".to_string()
        } else if self.category.is_void() {
            "return_void".to_string()
        } else {
            format!("return_{}", self.category.fragment_suffix())
        }
    }
}

/// One call variant: the first `argument_count` parameters are bound, the
/// rest take their defaults at the native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    pub index: usize,
    pub argument_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMismatch {
    /// Continue with the overload at this index.
    Next(usize),
    /// Raise the user-visible error.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverloadPlan {
    pub index: usize,
    pub required: usize,
    pub total: usize,
    pub parameters: Vec<ParameterPlan>,
    pub return_plan: ReturnPlan,
    pub blocks: Vec<BlockPlan>,
    pub flags: OverloadFlags,
    pub description: String,
    pub on_mismatch: OnMismatch,
}

impl OverloadPlan {
    pub fn is_last(&self) -> bool {
        self.on_mismatch == OnMismatch::Error
    }

    fn block_for(&self, argument_count: usize) -> Option<&BlockPlan> {
        self.blocks
            .iter()
            .find(|block| block.argument_count == argument_count)
    }

    fn check(&self, arguments: &[Argument]) -> Result<usize, Mismatch> {
        let block = self.block_for(arguments.len()).ok_or(Mismatch::ArgumentCount {
            given: arguments.len(),
            required: self.required,
            total: self.total,
        })?;

        for (parameter, argument) in self.parameters.iter().zip(arguments) {
            if parameter.accepts(argument) {
                continue;
            }
            return Err(match argument {
                Argument::Null => Mismatch::NullHandle {
                    position: parameter.position,
                },
                Argument::Value(_) => Mismatch::Argument {
                    position: parameter.position,
                    expected: parameter.category.clone(),
                },
            });
        }

        Ok(block.index)
    }
}

/// One (overload, block) pair in trial order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialUnit {
    pub overload: usize,
    pub block: usize,
    pub argument_count: usize,
    pub on_mismatch: OnMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionPlan {
    pub name: String,
    pub class: Option<String>,
    pub header: String,
    pub namespace: String,
    pub is_constructor: bool,
    pub overloads: Vec<OverloadPlan>,
}

/// A value handed to [`FunctionPlan::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Value(TypeCategory),
    /// A null object reference.
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    ArgumentCount {
        given: usize,
        required: usize,
        total: usize,
    },
    Argument {
        position: usize,
        expected: TypeCategory,
    },
    NullHandle {
        position: usize,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::ArgumentCount {
                given,
                required,
                total,
            } => write!(f, "{given} arguments given, {required} to {total} accepted"),
            Mismatch::Argument { position, expected } => {
                write!(f, "argument {} must be {expected}", position + 1)
            }
            Mismatch::NullHandle { position } => {
                write!(f, "argument {} may not be null", position + 1)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub overload: usize,
    pub block: usize,
    /// Overload indices tried, in order, ending with the resolved one.
    pub tried: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no overload of `{function}` accepts these arguments: {mismatch}")]
pub struct DispatchError {
    pub function: String,
    pub tried: Vec<usize>,
    /// Reason the last overload refused the call.
    pub mismatch: Mismatch,
}

impl FunctionPlan {
    pub fn block_count(&self) -> usize {
        self.overloads.iter().map(|overload| overload.blocks.len()).sum()
    }

    pub fn trial_chain(&self) -> Vec<TrialUnit> {
        self.overloads
            .iter()
            .flat_map(|overload| {
                overload.blocks.iter().map(move |block| TrialUnit {
                    overload: overload.index,
                    block: block.index,
                    argument_count: block.argument_count,
                    on_mismatch: overload.on_mismatch,
                })
            })
            .collect()
    }

    /// Follow the trial chain for a call with `arguments`.
    pub fn dispatch(&self, arguments: &[Argument]) -> Result<Resolution, DispatchError> {
        let mut tried = Vec::new();
        let mut current = if self.overloads.is_empty() { None } else { Some(0) };
        let mut last_mismatch = Mismatch::ArgumentCount {
            given: arguments.len(),
            required: 0,
            total: 0,
        };

        while let Some(index) = current {
            let overload = &self.overloads[index];
            tried.push(index);
            match overload.check(arguments) {
                Ok(block) => {
                    return Ok(Resolution {
                        overload: index,
                        block,
                        tried,
                    });
                }
                Err(mismatch) => {
                    last_mismatch = mismatch;
                    current = match overload.on_mismatch {
                        OnMismatch::Next(next) => Some(next),
                        OnMismatch::Error => None,
                    };
                }
            }
        }

        Err(DispatchError {
            function: self.name.clone(),
            tried,
            mismatch: last_mismatch,
        })
    }
}

pub struct OverloadPlanner<'a> {
    index: &'a TypeIndex,
    options: PlanOptions,
}

impl<'a> OverloadPlanner<'a> {
    pub fn new(index: &'a TypeIndex, options: PlanOptions) -> Self {
        Self { index, options }
    }

    /// Plan every overload of `function`, in declaration order. Unknown
    /// types are reported to `warnings` and planned as primitives.
    pub fn plan(&self, function: &Function, warnings: &mut WarningLog) -> FunctionPlan {
        let (header, namespace) = function
            .owner
            .as_ref()
            .map(|owner| (owner.header.clone(), owner.namespace.clone()))
            .unwrap_or_default();
        let context = match &function.class {
            Some(class) => format!("{header}: {class}::{}", function.name),
            None => format!("{header}: {}", function.name),
        };

        let count = function.overloads.len();
        let overloads = function
            .overloads
            .iter()
            .enumerate()
            .map(|(index, overload)| {
                let on_mismatch = if index + 1 < count {
                    OnMismatch::Next(index + 1)
                } else {
                    OnMismatch::Error
                };
                self.plan_overload(function, index, overload, on_mismatch, &context, warnings)
            })
            .collect();

        FunctionPlan {
            name: function.name.clone(),
            class: function.class.clone(),
            header,
            namespace,
            is_constructor: function.is_constructor(),
            overloads,
        }
    }

    fn plan_overload(
        &self,
        function: &Function,
        index: usize,
        overload: &Overload,
        on_mismatch: OnMismatch,
        context: &str,
        warnings: &mut WarningLog,
    ) -> OverloadPlan {
        let required = overload.required_count();
        let total = overload.total_count();

        let parameters = overload
            .parameters
            .iter()
            .enumerate()
            .map(|(position, parameter)| self.plan_parameter(position, parameter, context, warnings))
            .collect();

        let return_plan = if function.is_constructor() {
            ReturnPlan {
                declaration: String::new(),
                category: TypeCategory::Object,
                is_constructor: true,
            }
        } else if overload.return_type.is_void() {
            ReturnPlan {
                declaration: overload.return_type.ty.original_text.clone(),
                category: TypeCategory::Primitive(PrimitiveKind::Void),
                is_constructor: false,
            }
        } else {
            ReturnPlan {
                declaration: overload.return_type.ty.original_text.clone(),
                category: self.categorize(&overload.return_type.ty, context, warnings),
                is_constructor: false,
            }
        };

        let blocks = (required..=total)
            .enumerate()
            .map(|(index, argument_count)| BlockPlan {
                index,
                argument_count,
            })
            .collect();

        OverloadPlan {
            index,
            required,
            total,
            parameters,
            return_plan,
            blocks,
            flags: overload.flags,
            description: overload.description.clone(),
            on_mismatch,
        }
    }

    fn plan_parameter(
        &self,
        position: usize,
        parameter: &Parameter,
        context: &str,
        warnings: &mut WarningLog,
    ) -> ParameterPlan {
        let category = self.categorize(&parameter.ty, context, warnings);
        let requires_handle = category.is_object();
        let nullable =
            requires_handle && parameter.ty.is_pointer && self.options.nullable_object_pointers;

        ParameterPlan {
            position,
            name: parameter.name.clone(),
            declaration: parameter.ty.original_text.clone(),
            category,
            requires_handle,
            nullable,
            default_value: parameter.default_value.clone(),
        }
    }

    fn categorize(
        &self,
        ty: &TypeDescriptor,
        context: &str,
        warnings: &mut WarningLog,
    ) -> TypeCategory {
        let classification = self.index.classify(ty);
        if let Some(unknown) = classification.unknown {
            warnings.push(DataQualityWarning::UnknownType {
                context: context.to_string(),
                type_name: unknown.name,
                suggestion: unknown.suggestion,
            });
        }
        classification.category
    }
}

/// Whether a parameter of category `expected` takes a value of `given`.
fn category_accepts(expected: &TypeCategory, given: &TypeCategory) -> bool {
    use PrimitiveKind::*;

    match (expected, given) {
        (TypeCategory::Primitive(Unknown), TypeCategory::Primitive(_)) => true,
        (TypeCategory::Primitive(a), TypeCategory::Primitive(b)) => {
            a == b || matches!((a, b), (Integer | Float, Integer | Float))
        }
        (TypeCategory::Enumeration, TypeCategory::Enumeration)
        | (TypeCategory::Enumeration, TypeCategory::Primitive(Integer)) => true,
        (TypeCategory::Object, TypeCategory::Object) => true,
        (TypeCategory::Array(a), TypeCategory::Array(b)) => category_accepts(a, b),
        _ => false,
    }
}
