pub mod grades;
pub mod schedule;
pub mod status;
pub mod subjects;
