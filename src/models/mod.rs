//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod profile;
pub mod listing;
pub mod event;
pub mod post;

// Re-export commonly used models
pub use profile::{Account, AppRole, Profile, UpsertProfileRequest, UpdateProfileRequest};
pub use listing::{
    Listing, ListingCategory, ListingCondition, ListingStatus, ListingSort, ListingFilter,
    CreateListingRequest, UpdateListingRequest, Transaction, TransactionStatus,
};
pub use event::{
    Event, EventScope, GeoPoint, CreateEventRequest, UpdateEventRequest, Attendance,
    AttendanceStatus, AttendanceWithProfile, CheckInRequest, EventRegistration,
    RegistrationStatus, RegistrationWithProfile,
};
pub use post::{
    PostType, GeneratedPost, CreateGeneratedPostRequest, PostTemplate, CreateTemplateRequest,
    GeneratePostRequest,
};
