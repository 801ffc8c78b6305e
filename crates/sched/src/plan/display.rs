use core::fmt;

use super::{Plan, PlanStep, ScheduledStep};

impl Plan {
	fn write_steps(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
		let pad = "  ".repeat(depth);
		for step in &self.steps {
			match step {
				PlanStep::Run(step) => {
					write!(f, "{pad}run {}", step.schedulable().name())?;
					write_effects(f, step)?;
					writeln!(f)?;
				}
				PlanStep::Adapt(sub) => {
					let to = sub.plan.component_name();
					write!(f, "{pad}adapt {} -> {to}", sub.adapter.schedulable().name())?;
					if sub.exclusive {
						f.write_str(" (exclusive)")?;
					}
					writeln!(f)?;
					sub.plan.write_steps(f, depth + 1)?;
				}
				PlanStep::Barrier(name) => writeln!(f, "{pad}barrier {name}")?,
			}
		}
		Ok(())
	}
}

fn write_effects(f: &mut fmt::Formatter<'_>, step: &ScheduledStep) -> fmt::Result {
	let contract = step.contract();
	if !contract.remove.is_empty() {
		write!(f, " -{}", contract.remove)?;
	}
	if !contract.add.is_empty() {
		write!(f, " +{}", contract.add)?;
	}
	Ok(())
}

impl fmt::Display for Plan {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "plan for {} from {}", self.component_name(), self.entry)?;
		self.write_steps(f, 1)?;
		write!(f, "ending at {}", self.exit)
	}
}
