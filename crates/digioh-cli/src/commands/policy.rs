//! Policy command - print what each role may do.

use crate::ui;
use digioh_core::auth::{Capability, Role, capabilities_for};
use digioh_core::navigation::admin_navigation;

const CAPABILITIES: [(Capability, &str); 2] = [
    (Capability::AccessAdmin, "Admin area"),
    (Capability::ManageUsers, "Users"),
];

fn mark(allowed: bool) -> &'static str {
    if allowed { "yes" } else { "-" }
}

/// Print the role/capability table and each role's admin menu.
pub fn run_policy() {
    ui::header("Roles");
    println!();

    let mut row = vec![("Role", 14)];
    row.extend(CAPABILITIES.iter().map(|(_, label)| (*label, 14)));
    ui::table_row(&row);

    let roles = Role::ALL.map(Some).into_iter().chain([None]);
    for role in roles.clone() {
        let caps = capabilities_for(role);
        let mut row = vec![(role.map_or("(none)", Role::as_str), 14)];
        row.extend(
            CAPABILITIES
                .iter()
                .map(|(capability, _)| (mark(caps.allows(*capability)), 14)),
        );
        ui::table_row(&row);
    }

    ui::header("Admin navigation");
    for role in roles {
        let entries = admin_navigation(capabilities_for(role), "/admin");
        let names: Vec<&str> = entries.iter().map(|e| e.name).collect();
        ui::kv(
            role.map_or("(none)", Role::as_str),
            &if names.is_empty() {
                "no access".to_string()
            } else {
                names.join(", ")
            },
        );
    }
}
