//! Static course table: website, prerequisites and category per course.

pub struct CatalogEntry {
    pub code: &'static str,
    pub website: &'static str,
    pub category: &'static str,
    pub prerequisites: &'static [&'static str],
}

macro_rules! course {
    ($code:literal, $category:literal, $website:literal, [$($pre:literal),* $(,)?]) => {
        CatalogEntry {
            code: $code,
            website: $website,
            category: $category,
            prerequisites: &[$($pre),*],
        }
    };
}

/// Category names in display order.
pub const CATEGORIES: &[&str] = &[
    "CS Core",
    "CS Software",
    "CS Theory",
    "CS Hardware",
    "CS Applications",
    "EE Foundation",
    "EE Signals",
    "EE Robotics",
    "EE Circuits",
    "EE Power",
    "EE Devices",
    "EE Optics",
    "Physics",
];

pub const COURSES: &[CatalogEntry] = &[
    // CS
    course!("CS61A", "CS Core", "https://cs61a.org", []),
    course!("CS61B", "CS Core", "https://sp25.datastructur.es/", ["CS61A"]),
    course!("CS61C", "CS Core", "https://cs61c.org/fa25/", ["CS61A"]),
    course!("CS70", "CS Core", "https://www.eecs70.org/", ["CS61A"]),
    course!("CS160", "CS Software", "https://inst.eecs.berkeley.edu/~cs160/", ["CS61B"]),
    course!("CS161", "CS Software", "https://sp25.cs161.org/", ["CS61C", "CS70"]),
    course!("CS162", "CS Software", "https://cs162.org/", ["CS61C", "CS70"]),
    course!("CS164", "CS Software", "https://berkeley-cs164-sp25.github.io/", ["CS61B", "CS61C"]),
    course!("CS168", "CS Software", "https://sp25.cs168.io/", ["CS61B"]),
    course!("CS169", "CS Software", "https://saasbook.info/videos", ["CS61B", "CS61C"]),
    course!("CS170", "CS Theory", "https://cs170.org/", ["CS61B", "CS70"]),
    course!("CS172", "CS Theory", "https://www.avishaytal.org/cs-172-computability-and-complexity", ["CS170"]),
    course!("CS174", "CS Theory", "https://people.eecs.berkeley.edu/~jordan/courses/174-spring02/notes.html", ["CS170"]),
    course!("CS176", "CS Theory", "https://inst.eecs.berkeley.edu/~cs176/", ["CS170", "CS188", "EECS126"]),
    course!("CS191", "CS Theory", "https://inst.eecs.berkeley.edu/~cs191/", ["CS170", "Physics7B"]),
    course!("CS152", "CS Hardware", "https://tree.yuantsy.com/Course2/docs/CS152/", ["CS61C", "EECS16B"]),
    course!("CS184", "CS Applications", "https://cs184.eecs.berkeley.edu/su25/", ["CS61B"]),
    course!("CS186", "CS Applications", "https://cs186berkeley.net/notes/", ["CS61B", "CS61C"]),
    course!("CS188", "CS Applications", "https://inst.eecs.berkeley.edu/~cs188/fa25/", ["CS61B", "CS70", "CS170"]),
    course!("CS189", "CS Applications", "https://people.eecs.berkeley.edu/~jrs/papers/machlearn.pdf", ["CS188"]),
    // EE
    course!("EECS16A", "EE Foundation", "https://eecs16a.org/", []),
    course!("EECS16B", "EE Foundation", "https://eecs16b.org/", ["EECS16A"]),
    course!("EECS120", "EE Signals", "https://ee120-course-staff.github.io/", ["EECS16B"]),
    course!("EECS123", "EE Signals", "https://sites.google.com/berkeley.edu/ee123-sp25/home", ["EECS120"]),
    course!("EECS126", "EE Signals", "https://github.com/PKUFlyingPig/EECS126/tree/master", ["EECS16B", "CS70"]),
    course!("EECS127", "EE Signals", "https://inst.eecs.berkeley.edu/~ee127/sp21/livebook/", ["EECS16B", "CS70"]),
    course!("EECS145B", "EE Signals", "https://inst.eecs.berkeley.edu/~ee145b/", ["EECS120"]),
    course!("EECS122", "EE Signals", "https://kevinfall.com/ucbpage/EE122/", ["CS70"]),
    course!("EECS144", "EE Robotics", "https://ptolemy.berkeley.edu/projects/embedded/eecsx44/lectures/index.html", ["EECS16B"]),
    course!("EECS145L", "EE Robotics", "https://inst.eecs.berkeley.edu/~ee145l/", []),
    course!("EECS149", "EE Robotics", "https://ptolemy.berkeley.edu/books/leeseshia/releases/LeeSeshia_DigitalV2_3.pdf", ["EECS16B"]),
    course!("EECS106A", "EE Robotics", "https://ucb-ee106.github.io/eecs106a-fa23site/", ["EECS16B", "CS61B", "CS61A"]),
    course!("EECS106B", "EE Robotics", "https://ucb-ee106.github.io/106b-sp24site/", ["EECS106A"]),
    course!("EECS128", "EE Robotics", "https://aditya-sengupta.github.io/notes/eec128.pdf", ["EECS16B", "EECS120"]),
    course!("EECS192", "EE Robotics", "https://inst.eecs.berkeley.edu/~ee192/", ["CS61C", "EECS16B", "EECS120"]),
    course!("EECS105", "EE Circuits", "https://inst.eecs.berkeley.edu/~ee105/", ["EECS16B"]),
    course!("EECS140", "EE Circuits", "http://www.infocobuild.com/education/audio-video-courses/electronics/ee140-spring2014-berkeley.html", ["EECS105"]),
    course!("EECS142", "EE Circuits", "https://rfic.eecs.berkeley.edu/courses/ee142/lectures.html", ["EECS140", "EECS120"]),
    course!("EECS108", "EE Power", "https://inst.eecs.berkeley.edu/~ee108/", ["EECS16B"]),
    course!("EECS113", "EE Power", "https://inst.eecs.berkeley.edu/~ee113/", ["EECS108", "EECS105", "Physics7B"]),
    course!("EECS137A", "EE Power", "https://www.keithmoffat.com/intrepslecturenotes", ["EECS16B", "Physics7B"]),
    course!("EECS137B", "EE Power", "https://www.keithmoffat.com/intrepslecturenotes", ["EECS137A"]),
    course!("EECS130", "EE Devices", "https://www.youtube.com/playlist?list=PLZHcIYJIAiQiw-2BsC79s96H_VCcKR8xu", ["EECS16B", "EECS105"]),
    course!("EECS134", "EE Devices", "https://inst.eecs.berkeley.edu/~ee134/", ["EECS16B"]),
    course!("EECS143", "EE Devices", "https://inst.eecs.berkeley.edu/~ee143/", ["EECS16B", "Physics7B"]),
    course!("EECS147", "EE Devices", "https://people.eecs.berkeley.edu/~pister/147fa16/index.htm", ["EECS16B", "Physics7B"]),
    course!("EECS118", "EE Optics", "https://inst.eecs.berkeley.edu/~ee118/", ["EECS16B", "Physics7B"]),
    // Physics
    course!("Physics7B", "Physics", "https://jshen13.github.io/static/physics7b_sg-33dfad7cd5fd60fe588f34c106b1044b.pdf", []),
];

pub const PRIORITY_CORE: &[&str] = &["CS61A", "CS61B", "CS61C", "CS70", "EECS16A", "EECS16B"];
pub const PRIORITY_THEORY: &[&str] = &["CS170", "CS172", "CS174"];
pub const PRIORITY_SOFTWARE: &[&str] = &["CS161", "CS162", "CS164", "CS168"];

pub const MAX_RECOMMENDED: usize = 10;
