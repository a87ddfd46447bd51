//! Customer directory: accounts and the contacts attached to them

use crate::core::association::AssociationSync;
use crate::core::record::record_key;
use crate::impl_record;
use crate::screens::AssociationSet;
use uuid::Uuid;

impl_record!(
    Contact,
    "contact",
    "contacts",
    {
        name: String,
        email: String,
        phone: Option<String>,
        account: Option<::uuid::Uuid>,
    }
);

impl_record!(
    Account,
    "account",
    "accounts",
    {
        name: String,
        email: Option<String>,
        phone: Option<String>,
    },
    associations {
        contacts: Contact,
    }
);

#[derive(Debug)]
pub struct AccountAssociations {
    pub contacts: AssociationSync<Contact, Uuid>,
}

impl Default for AccountAssociations {
    fn default() -> Self {
        Self {
            contacts: AssociationSync::new(record_key::<Contact>),
        }
    }
}

impl AssociationSet<Account> for AccountAssociations {
    fn load(&mut self, account: &Account) {
        self.contacts
            .load_membership(account.contacts.iter().cloned());
    }

    fn resume(&mut self, account: &Account) {
        self.contacts
            .resume_membership(account.contacts.iter().cloned());
    }

    fn flatten_into(&self, account: &mut Account) {
        account.contacts = self.contacts.snapshot();
    }

    fn has_pending_changes(&self) -> bool {
        self.contacts.has_pending_changes()
    }
}
