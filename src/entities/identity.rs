//! Access-control records: privileges are granted to roles, roles to users
//! and groups

use crate::core::association::AssociationSync;
use crate::core::record::record_key;
use crate::impl_record;
use crate::screens::AssociationSet;
use uuid::Uuid;

impl_record!(
    Privilege,
    "privilege",
    "privileges",
    {
        name: String,
        description: Option<String>,
    }
);

impl_record!(
    User,
    "user",
    "users",
    {
        login: String,
        name: String,
        email: String,
    }
);

impl_record!(
    Role,
    "role",
    "roles",
    {
        name: String,
        description: Option<String>,
    },
    associations {
        privileges: Privilege,
        users: User,
    }
);

impl_record!(
    Group,
    "group",
    "groups",
    {
        name: String,
        description: Option<String>,
    },
    associations {
        roles: Role,
    }
);

/// Synchronizers of the role edit screen
#[derive(Debug)]
pub struct RoleAssociations {
    pub privileges: AssociationSync<Privilege, Uuid>,
    pub users: AssociationSync<User, Uuid>,
}

impl Default for RoleAssociations {
    fn default() -> Self {
        Self {
            privileges: AssociationSync::new(record_key::<Privilege>),
            users: AssociationSync::new(record_key::<User>),
        }
    }
}

impl AssociationSet<Role> for RoleAssociations {
    fn load(&mut self, role: &Role) {
        self.privileges.load_membership(role.privileges.iter().cloned());
        self.users.load_membership(role.users.iter().cloned());
    }

    fn resume(&mut self, role: &Role) {
        self.privileges
            .resume_membership(role.privileges.iter().cloned());
        self.users.resume_membership(role.users.iter().cloned());
    }

    fn flatten_into(&self, role: &mut Role) {
        role.privileges = self.privileges.snapshot();
        role.users = self.users.snapshot();
    }

    fn has_pending_changes(&self) -> bool {
        self.privileges.has_pending_changes() || self.users.has_pending_changes()
    }
}

/// Synchronizer of the group edit screen
#[derive(Debug)]
pub struct GroupAssociations {
    pub roles: AssociationSync<Role, Uuid>,
}

impl Default for GroupAssociations {
    fn default() -> Self {
        Self {
            roles: AssociationSync::new(record_key::<Role>),
        }
    }
}

impl AssociationSet<Group> for GroupAssociations {
    fn load(&mut self, group: &Group) {
        self.roles.load_membership(group.roles.iter().cloned());
    }

    fn resume(&mut self, group: &Group) {
        self.roles.resume_membership(group.roles.iter().cloned());
    }

    fn flatten_into(&self, group: &mut Group) {
        group.roles = self.roles.snapshot();
    }

    fn has_pending_changes(&self) -> bool {
        self.roles.has_pending_changes()
    }
}
