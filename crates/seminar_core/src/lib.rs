pub mod assignment;
pub mod directory;
pub mod domain;
pub mod error;
pub mod export;
pub mod import;
pub mod keys;
pub mod ports;
pub mod registry;
pub mod students;

mod memory;
pub use memory::MemoryStore;

pub use assignment::TopicAssigner;
pub use directory::AccountDirectory;
pub use domain::{
    AssignmentMode, AssignmentResult, AuthSession, Class, CsvExport, DeletionReport, GroupMember,
    Lecturer, NewClass, NewLecturer, RosterEntry, SessionUser, Student, StudentFilter,
    StudentListing,
};
pub use error::{ServiceError, ServiceResult};
pub use ports::{
    CredentialHasher, KeyValueStore, KvDeleted, KvEntry, KvKeys, PortError, PortResult,
    RandomPicker, TopicPicker,
};
pub use registry::ClassRegistry;
pub use students::StudentRegistry;
