mod helpers;
mod objectives;
mod plan;
mod productivity;
mod reasons;
mod routine;
mod sobriety;

pub(crate) use objectives::{
    cmd_objectives_show, cmd_objectives_update, cmd_step_add, cmd_step_toggle,
};
pub(crate) use plan::{cmd_plan_add, cmd_plan_show, cmd_plan_toggle};
pub(crate) use productivity::{cmd_productivity_save, cmd_productivity_show};
pub(crate) use reasons::{cmd_reason_add, cmd_reason_delete, cmd_reason_list};
pub(crate) use routine::{cmd_routine_show, cmd_routine_toggle};
pub(crate) use sobriety::{cmd_consumption_add, cmd_sobriety_show, cmd_substance_add};
