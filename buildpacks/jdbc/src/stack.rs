use libcnb::Target;
use std::env;

const STACK_ID_ENV: &str = "CNB_STACK_ID";

/// Determines the stack of the current build.
pub(crate) fn current_stack_id(target: &Target) -> Option<String> {
    stack_id(env::var(STACK_ID_ENV).ok(), target)
}

// Platforms exporting `CNB_STACK_ID` take precedence. Otherwise the target distribution maps to
// `<distro name>-<distro version>`. Targets without a distribution (Windows) have no stack.
fn stack_id(stack_id_var: Option<String>, target: &Target) -> Option<String> {
    stack_id_var
        .filter(|stack_id| !stack_id.trim().is_empty())
        .or_else(|| {
            let distro_name = target.distro_name.trim();
            let distro_version = target.distro_version.trim();

            (!distro_name.is_empty() && !distro_version.is_empty())
                .then(|| format!("{distro_name}-{distro_version}"))
        })
}
