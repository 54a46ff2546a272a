//! Business rules over the backend tables. Every operation takes the
//! [`Backend`](crate::api::Backend) bundle and returns a [`ServiceResult`].

pub mod attendance;
pub mod auth;
pub mod backup;
pub mod error;
pub mod reports;
pub mod restore;
pub mod settings;
pub mod staff;

pub use error::{ServiceError, ServiceResult};

/// Shared pagination arguments, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Paged<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    pub fn total_pages(&self, limit: u64) -> u64 {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(limit.max(1))
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
pub(crate) mod testing {
    use std::rc::Rc;

    use chrono::NaiveDate;

    use crate::api::test_support::{fixtures::staff_row, MemoryBackend};
    use crate::utils::time::FixedClock;

    pub fn memory_at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Rc<MemoryBackend> {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        MemoryBackend::new(FixedClock::at_local(chrono_tz::UTC, date, hour, minute))
    }

    fn signed_in(memory: &MemoryBackend, id: &str, code: &str, name: &str, role: &str) {
        memory.seed("staff", vec![staff_row(id, code, name, role, "Operations")]);
        let email = format!("{}@example.com", name.to_lowercase());
        memory.add_account(&email, "secret1");
        memory.sign_in_as(&email);
    }

    pub fn with_admin(memory: &MemoryBackend, id: &str, code: &str, name: &str) {
        signed_in(memory, id, code, name, "Admin");
    }

    pub fn with_staff(memory: &MemoryBackend, id: &str, code: &str, name: &str) {
        signed_in(memory, id, code, name, "Staff");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_to_one() {
        assert_eq!(PageRequest::new(0, 0), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::default(), PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn total_pages_rounds_up_and_never_hits_zero() {
        let paged: Paged<()> = Paged {
            items: vec![],
            total: 21,
        };
        assert_eq!(paged.total_pages(10), 3);
        assert_eq!(Paged::<()>::empty().total_pages(10), 1);
    }
}
