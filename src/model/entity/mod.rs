mod user;
pub use user::{GoogleProfile, UserEntity, UserEntityCreateUpdate};

mod course;
pub use course::{Course, CourseCreate};

mod lesson;
pub use lesson::{Lesson, LessonCreate};

mod concept;
pub use concept::{Concept, ConceptCreate};

mod exercise;
pub use exercise::{Exercise, ExerciseCreate};

mod progress;
pub use progress::{Progress, ProgressUpdate, overall_percentage};

mod user_course;
pub use user_course::{CourseStatus, UserCourse, UserCourseCreate};

mod lesson_progress;
pub use lesson_progress::{LessonProgress, LessonProgressUpdate};

mod homework_assignment;
pub use homework_assignment::{HomeworkAssignment, HomeworkAssignmentCreate};

mod week_video;
pub use week_video::WeekVideo;
