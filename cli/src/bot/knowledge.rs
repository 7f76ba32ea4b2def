//! # Institutional Knowledge Base
//!
//! File: cli/src/bot/knowledge.rs
//!
//! ## Overview
//!
//! Compiled-in facts about the Nalanda Institute of Technology: contact
//! details, departments, facilities, admissions, placements, campus services.
//! The data is static and read-only; answers are assembled from it by the
//! responder and exposed verbatim through `/api/knowledge` and `edubot kb`.
//!
//! Ordered key/value groups are stored as [`Keyed`] slices so the declaration
//! order survives both HTML rendering and JSON serialization.
//!
//! ## Examples
//!
//! ```rust
//! let contact = knowledge::college_info("contact");
//! let hits = knowledge::search(&["hostel", "fee"]);
//! ```
//!
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{json, Value};
use tracing::warn;

/// Ordered `(key, value)` pairs that serialize as a JSON object.
#[derive(Debug, Clone, Copy)]
pub struct Keyed<T: 'static>(pub &'static [(&'static str, T)]);

/// Ordered text pairs, the most common shape in the knowledge base.
pub type KeyValues = Keyed<&'static str>;

impl<T: 'static> Keyed<T> {
    pub fn iter(&self) -> impl Iterator<Item = &'static (&'static str, T)> {
        self.0.iter()
    }

    pub fn get(&self, key: &str) -> Option<&'static T> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Serialize + 'static> Serialize for Keyed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CollegeInfo {
    pub name: &'static str,
    pub location: KeyValues,
    pub contact: KeyValues,
    pub social_media: KeyValues,
    pub accreditation: &'static str,
    pub statistics: KeyValues,
}

#[derive(Debug, serde::Serialize)]
pub struct Department {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub programs: &'static [&'static str],
    pub specializations: &'static [&'static str],
    pub labs: &'static [&'static str],
}

#[derive(Debug, serde::Serialize)]
pub struct Facilities {
    pub academic: &'static [&'static str],
    pub campus_life: &'static [&'static str],
    pub sports: &'static [&'static str],
    pub student_activities: &'static [&'static str],
    pub technology: &'static [&'static str],
}

#[derive(Debug, serde::Serialize)]
pub struct Eligibility {
    pub qualification: &'static str,
    pub minimum_marks: &'static str,
    pub entrance_exam: &'static str,
    pub age_limit: &'static str,
}

#[derive(Debug, serde::Serialize)]
pub struct Admissions {
    pub process: &'static [&'static str],
    pub eligibility: Keyed<Eligibility>,
    pub fee_structure: KeyValues,
    pub important_dates: KeyValues,
    pub documents_required: &'static [&'static str],
    pub scholarships_available: &'static [&'static str],
    pub contact_admissions: KeyValues,
    pub important_pages: &'static [&'static str],
}

#[derive(Debug, serde::Serialize)]
pub struct Academics {
    pub resources: &'static [&'static str],
    pub important_links: KeyValues,
}

#[derive(Debug, serde::Serialize)]
pub struct Placement {
    pub statistics: KeyValues,
    pub top_recruiters: &'static [&'static str],
    pub support_services: &'static [&'static str],
    pub internship_programs: KeyValues,
    pub training_programs: &'static [&'static str],
    pub entrepreneurship: KeyValues,
    pub higher_studies_support: &'static [&'static str],
    pub page: &'static str,
    pub contact: KeyValues,
}

#[derive(Debug, serde::Serialize)]
pub struct Research {
    pub focus_areas: &'static [&'static str],
    pub page: &'static str,
}

#[derive(Debug, serde::Serialize)]
pub struct Alumni {
    pub network: &'static str,
    pub page: &'static str,
    pub benefits: &'static [&'static str],
}

#[derive(Debug, serde::Serialize)]
pub struct Event {
    pub name: &'static str,
    pub month: &'static str,
    pub events: &'static [&'static str],
    pub details: KeyValues,
}

#[derive(Debug, serde::Serialize)]
pub struct FacultyInfo {
    pub total_faculty: &'static str,
    pub phd_holders: &'static str,
    pub experience: &'static str,
    pub publications: &'static str,
    pub student_faculty_ratio: &'static str,
    pub faculty_development: &'static [&'static str],
}

#[derive(Debug, serde::Serialize)]
pub struct AlumniSuccess {
    pub network_size: &'static str,
    pub placement_companies: &'static [&'static str],
    pub higher_studies: &'static [&'static str],
    pub entrepreneurs: &'static str,
    pub mentorship: &'static str,
    pub events: &'static [&'static str],
}

#[derive(Debug, serde::Serialize)]
pub struct InnovationHub {
    pub research_centers: &'static [&'static str],
    pub patents_filed: &'static str,
    pub research_grants: &'static str,
    pub publications: &'static str,
    pub collaborations: &'static [&'static str],
}

#[derive(Debug, serde::Serialize)]
pub struct Dining {
    pub mess: KeyValues,
    pub cafeteria: &'static [&'static str],
    pub night_canteen: KeyValues,
}

pub static COLLEGE_INFO: CollegeInfo = CollegeInfo {
    name: "Nalanda Institute of Technology (NIT Nalanda)",
    location: Keyed(&[
        ("address", "Buddhist Villa, Chandaka, Bhubaneswar, Odisha 751024"),
        ("city", "Bhubaneswar"),
        ("state", "Odisha"),
        ("country", "India"),
        ("pin_code", "751024"),
        ("maps_link", "https://www.google.com/maps/dir//Nalanda+Institute+of+Technology"),
    ]),
    contact: Keyed(&[
        ("phone", "+91 99371 65074"),
        ("email", "info@thenalanda.com"),
        ("website", "https://www.thenalanda.com"),
    ]),
    social_media: Keyed(&[
        ("facebook", "https://www.facebook.com/share/1AG6TvcnQi/"),
        ("twitter", "https://x.com/NALANDABHUBANE1"),
        ("instagram", "https://www.instagram.com/nalandabbsr"),
        ("linkedin", "https://www.linkedin.com/company/nalanda-institute-of-technology-bhubaneswar/"),
        ("youtube", "https://youtube.com/@nalandabhubaneswar4971"),
    ]),
    accreditation: "NAAC A+ Accredited",
    statistics: Keyed(&[
        ("total_students", "15,000+"),
        ("alumni", "50,000+"),
        ("programs", "150+"),
        ("establishment_year", "Not specified"),
    ]),
};

pub static DEPARTMENTS: &[Department] = &[
    Department {
        name: "Computer Science & Engineering",
        kind: "Engineering",
        programs: &["B.Tech", "M.Tech", "PhD"],
        specializations: &["AI & ML", "Data Science", "Cyber Security", "Cloud Computing"],
        labs: &["Programming Lab", "AI/ML Lab", "Networks Lab", "Database Lab"],
    },
    Department {
        name: "Electronics & Communication Engineering",
        kind: "Engineering",
        programs: &["B.Tech", "M.Tech"],
        specializations: &["VLSI Design", "Embedded Systems", "IoT", "Signal Processing"],
        labs: &["Digital Electronics Lab", "Communication Lab", "Microprocessor Lab"],
    },
    Department {
        name: "Mechanical Engineering",
        kind: "Engineering",
        programs: &["B.Tech", "M.Tech"],
        specializations: &["Robotics", "CAD/CAM", "Thermal Engineering", "Manufacturing"],
        labs: &["Workshop", "CAD Lab", "Thermal Lab", "Fluid Mechanics Lab"],
    },
    Department {
        name: "Civil Engineering",
        kind: "Engineering",
        programs: &["B.Tech", "M.Tech"],
        specializations: &["Structural Engineering", "Transportation", "Environmental", "Geotechnical"],
        labs: &["Concrete Testing Lab", "Surveying Lab", "Soil Mechanics Lab"],
    },
    Department {
        name: "Electrical Engineering",
        kind: "Engineering",
        programs: &["B.Tech", "M.Tech"],
        specializations: &["Power Systems", "Control Systems", "Renewable Energy", "Electric Vehicles"],
        labs: &["Power Systems Lab", "Control Lab", "Machines Lab", "Energy Lab"],
    },
    Department {
        name: "Information Technology",
        kind: "Engineering",
        programs: &["B.Tech", "M.Tech"],
        specializations: &["Web Development", "Mobile Apps", "DevOps", "Blockchain"],
        labs: &["IT Lab", "Software Engineering Lab", "Mobile App Lab"],
    },
    Department {
        name: "Artificial Intelligence & Data Science",
        kind: "Engineering",
        programs: &["B.Tech", "M.Tech"],
        specializations: &["Deep Learning", "NLP", "Computer Vision", "Big Data Analytics"],
        labs: &["AI Lab", "Data Science Lab", "ML Lab", "Analytics Lab"],
    },
];

pub static FACILITIES: Facilities = Facilities {
    academic: &[
        "Central Library with 50,000+ books and e-resources",
        "Digital Library with IEEE, ACM, Springer access",
        "50+ Modern Computer Labs with latest software",
        "Research & Innovation Center",
        "Smart Classrooms with projectors and AV systems",
        "Seminar Halls (capacity 200-500)",
        "Specialized Laboratories for all departments",
        "Maker Space for prototyping and innovation",
        "Language Lab for communication skills",
        "E-learning platforms and MOOCs access",
    ],
    campus_life: &[
        "Separate AC/Non-AC Hostels for Boys and Girls",
        "24x7 Wi-Fi enabled campus with 1Gbps internet",
        "Multi-cuisine Cafeteria and Dining Halls",
        "Medical Center with resident doctor and ambulance",
        "ATM and Banking facilities on campus",
        "Stationery and Photocopy center",
        "Transportation facilities to city",
        "Guest House for parents and visitors",
        "24/7 CCTV surveillance and security",
        "Laundry services in hostels",
    ],
    sports: &[
        "Football Ground",
        "Cricket Ground",
        "Basketball Courts",
        "Volleyball Courts",
        "Badminton Courts (indoor)",
        "Table Tennis facility",
        "Gymnasium with modern equipment",
        "Indoor game room (Chess, Carrom)",
        "Athletics Track",
        "Yoga and Meditation center",
    ],
    student_activities: &[
        "Student Creativity Hub for art, music, photography",
        "Technical Club (coding, robotics, electronics)",
        "Cultural Club (dance, drama, music)",
        "Literary Club (writing, debate, quiz)",
        "Entrepreneurship Cell (E-Cell)",
        "NSS (National Service Scheme)",
        "Student Council and committees",
        "Annual Technical Festival",
        "Annual Cultural Festival",
        "Sports Meet and competitions",
        "Hackathons and coding competitions",
        "Industry visits and guest lectures",
    ],
    technology: &[
        "Enterprise Resource Planning (ERP) system",
        "Online attendance system",
        "Digital assignment submission portal",
        "Virtual classrooms and online exams",
        "Mobile app for students",
        "Biometric attendance",
        "SMS and email alerts to parents",
    ],
};

pub static ADMISSIONS: Admissions = Admissions {
    process: &[
        "Step 1: Online Application through official website (www.thenalanda.com/admissions)",
        "Step 2: Entrance Exam based admission (JEE Main for B.Tech, GATE for M.Tech)",
        "Step 3: Merit-based selection and counseling",
        "Step 4: Document verification (original certificates required)",
        "Step 5: Fee payment and admission confirmation",
        "Step 6: Hostel allocation (if required)",
    ],
    eligibility: Keyed(&[
        (
            "B.Tech",
            Eligibility {
                qualification: "10+2 or equivalent with Physics, Chemistry, Mathematics (PCM)",
                minimum_marks: "50% aggregate (45% for SC/ST)",
                entrance_exam: "JEE Main / State CET",
                age_limit: "No age limit",
            },
        ),
        (
            "M.Tech",
            Eligibility {
                qualification: "B.Tech/BE in relevant discipline from recognized university",
                minimum_marks: "55% aggregate (50% for SC/ST)",
                entrance_exam: "GATE score / University entrance test",
                age_limit: "No age limit",
            },
        ),
        (
            "PhD",
            Eligibility {
                qualification: "M.Tech/ME with valid GATE score or equivalent",
                minimum_marks: "60% aggregate in postgraduation",
                entrance_exam: "Research aptitude test + Interview",
                age_limit: "As per UGC norms",
            },
        ),
    ]),
    fee_structure: Keyed(&[
        ("B.Tech_per_year", "₹80,000 - ₹1,20,000 (varies by category)"),
        ("M.Tech_per_year", "₹60,000 - ₹90,000"),
        ("hostel_per_year", "₹40,000 - ₹60,000 (AC/Non-AC)"),
        ("mess_charges", "₹25,000 - ₹30,000 per year"),
        ("one_time_charges", "₹15,000 (admission + caution deposit)"),
        ("payment_modes", "Online payment, Demand Draft, Cash (at counter)"),
    ]),
    important_dates: Keyed(&[
        ("application_start", "Usually March/April"),
        ("application_deadline", "June/July"),
        ("counseling", "July/August"),
        ("classes_begin", "August/September"),
        ("note", "Check website for exact dates"),
    ]),
    documents_required: &[
        "10th & 12th Mark sheets and certificates",
        "JEE Main / GATE scorecard",
        "Transfer Certificate from previous institution",
        "Migration Certificate (if applicable)",
        "Category certificate (SC/ST/OBC)",
        "Income certificate (for fee concession)",
        "Aadhar card copy",
        "Passport size photographs (10 copies)",
        "Medical fitness certificate",
    ],
    scholarships_available: &[
        "Merit-based scholarships (top performers)",
        "Government scholarships (SC/ST/OBC/Minority)",
        "Fee waiver for economically weaker sections",
        "Sports quota scholarships",
        "Girl child education scholarships",
        "Alumni sponsored scholarships",
    ],
    contact_admissions: Keyed(&[
        ("email", "admissions@thenalanda.com"),
        ("phone", "+91 99371 65074"),
        ("helpdesk", "Available on student portal"),
    ]),
    important_pages: &[
        "Admissions: https://www.thenalanda.com/admissions",
        "Student Portal: https://www.thenalanda.com/student-portal",
        "Fee Payment: https://www.thenalanda.com/fees",
    ],
};

pub static ACADEMICS: Academics = Academics {
    resources: &[
        "Academic Calendar",
        "Examination Portal",
        "Results Portal",
        "Faculty Information",
        "Course Materials",
        "Online Learning Resources",
    ],
    important_links: Keyed(&[
        ("departments", "https://www.thenalanda.com/departments"),
        ("faculty", "https://www.thenalanda.com/faculty"),
        ("library", "https://www.thenalanda.com/library"),
        ("calendar", "https://www.thenalanda.com/calendar"),
        ("examination", "https://www.thenalanda.com/examination"),
        ("results", "https://www.thenalanda.com/results"),
    ]),
};

pub static PLACEMENT: Placement = Placement {
    statistics: Keyed(&[
        ("placement_rate", "85-90% annually"),
        ("highest_package", "₹45 LPA (2024)"),
        ("average_package", "₹6.5 LPA"),
        ("median_package", "₹5.2 LPA"),
        ("companies_visited", "150+ companies annually"),
    ]),
    top_recruiters: &[
        "TCS, Infosys, Wipro, Tech Mahindra",
        "Amazon, Microsoft, Google, Adobe",
        "Accenture, Capgemini, Cognizant",
        "L&T, Siemens, ABB, Schneider Electric",
        "BHEL, NTPC, Indian Railways, ISRO",
        "Flipkart, Paytm, PhonePe, Swiggy",
        "Deloitte, Ernst & Young, KPMG, PwC",
    ],
    support_services: &[
        "Dedicated Training & Placement Cell",
        "Aptitude and reasoning training",
        "Technical skill development workshops",
        "Soft skills and communication training",
        "Resume building and LinkedIn profile workshops",
        "Mock interviews with industry experts",
        "Group discussion and presentation practice",
        "Internship opportunities with stipend",
        "Industry projects and live assignments",
        "Career counseling sessions",
    ],
    internship_programs: Keyed(&[
        ("duration", "2-6 months"),
        ("companies", "200+ companies offer internships"),
        ("stipend_range", "₹5,000 - ₹50,000 per month"),
        ("conversion_rate", "40% interns get PPO (Pre-Placement Offer)"),
    ]),
    training_programs: &[
        "C, C++, Java, Python programming",
        "Data Structures & Algorithms",
        "Database Management (SQL, MongoDB)",
        "Web Development (HTML, CSS, JavaScript, React)",
        "Mobile App Development (Android, Flutter)",
        "Cloud Computing (AWS, Azure, Google Cloud)",
        "DevOps and CI/CD",
        "Machine Learning and AI fundamentals",
        "Competitive programming practice",
        "Aptitude and Logical Reasoning",
    ],
    entrepreneurship: Keyed(&[
        ("incubation_center", "Available for student startups"),
        ("funding_support", "Seed funding up to ₹10 lakhs"),
        ("mentorship", "Industry mentors and alumni network"),
        ("success_stories", "15+ student startups launched"),
    ]),
    higher_studies_support: &[
        "GRE/TOEFL/IELTS preparation classes",
        "Statement of Purpose (SOP) guidance",
        "University application assistance",
        "Scholarship information for abroad studies",
    ],
    page: "https://www.thenalanda.com/placement",
    contact: Keyed(&[
        ("email", "placement@thenalanda.com"),
        ("phone", "+91 99371 65074"),
        ("office_hours", "9:00 AM - 5:00 PM (Mon-Sat)"),
    ]),
};

pub static STUDENT_SUPPORT: KeyValues = Keyed(&[
    ("scholarships", "https://www.thenalanda.com/scholarships"),
    ("hostel", "https://www.thenalanda.com/hostel"),
    ("sports", "https://www.thenalanda.com/sports"),
    ("clubs", "https://www.thenalanda.com/clubs"),
]);

pub static RESEARCH: Research = Research {
    focus_areas: &[
        "Cutting-edge Technology Research",
        "Innovation Labs",
        "Industry Collaborations",
        "Student Research Projects",
        "Faculty Research Publications",
    ],
    page: "https://www.thenalanda.com/research",
};

pub static ALUMNI: Alumni = Alumni {
    network: "50,000+ Alumni worldwide",
    page: "https://www.thenalanda.com/alumni",
    benefits: &[
        "Alumni Network Access",
        "Career Support",
        "Mentorship Programs",
        "Networking Events",
        "Continued Learning Opportunities",
    ],
};

/// Short answers for common one-fact questions.
pub static QUICK_ANSWERS: KeyValues = Keyed(&[
    ("address", "Buddhist Villa, Chandaka, Bhubaneswar, Odisha 751024"),
    ("phone", "+91 99371 65074"),
    ("email", "info@thenalanda.com"),
    ("website", "https://www.thenalanda.com"),
    ("accreditation", "NAAC A+ Accredited"),
    ("students", "15,000+ students"),
    ("alumni", "50,000+ alumni"),
    ("programs", "150+ programs offered"),
    ("establishment", "Established in early 2000s"),
    ("type", "Private Engineering College affiliated to BPUT"),
    ("ranking", "Among top engineering colleges in Odisha"),
]);

pub static EVENTS_CALENDAR: Keyed<Event> = Keyed(&[
    (
        "technical_fest",
        Event {
            name: "TechnoNalanda",
            month: "February",
            events: &["Coding Marathon", "Robotics Competition", "Project Expo", "Tech Quiz", "Hackathon"],
            details: Keyed(&[("prizes", "Total ₹5 lakhs+ in prizes")]),
        },
    ),
    (
        "cultural_fest",
        Event {
            name: "Nalanda Mahotsav",
            month: "March",
            events: &["Dance Competition", "Music Concert", "Drama", "Fashion Show", "Celebrity Night"],
            details: Keyed(&[("participation", "Students from 50+ colleges")]),
        },
    ),
    (
        "sports_events",
        Event {
            name: "Sports Carnival",
            month: "January & September",
            events: &["Cricket Tournament", "Football League", "Athletics Meet", "Indoor Games Championship"],
            details: Keyed(&[]),
        },
    ),
    (
        "workshops_seminars",
        Event {
            name: "Workshops & Seminars",
            month: "Monthly",
            events: &["Industry 4.0", "AI/ML", "IoT", "Entrepreneurship", "Soft Skills"],
            details: Keyed(&[("speakers", "Industry experts and alumni")]),
        },
    ),
]);

pub static FACULTY_INFO: FacultyInfo = FacultyInfo {
    total_faculty: "200+ qualified faculty members",
    phd_holders: "60%+ faculty with PhD degrees",
    experience: "Average 10+ years of teaching experience",
    publications: "500+ research papers published",
    student_faculty_ratio: "20:1",
    faculty_development: &[
        "Regular FDP (Faculty Development Programs)",
        "Industry internships for faculty",
        "Research grants and support",
        "Conference participation support",
    ],
};

pub static ALUMNI_SUCCESS: AlumniSuccess = AlumniSuccess {
    network_size: "50,000+ alumni worldwide",
    placement_companies: &["Google", "Microsoft", "Amazon", "TCS", "Infosys", "Wipro"],
    higher_studies: &["IITs", "NITs", "IIMs", "Foreign Universities (US, UK, Germany, Canada)"],
    entrepreneurs: "100+ alumni-founded startups",
    mentorship: "Alumni mentor current students",
    events: &["Annual Alumni Meet", "Guest Lectures", "Industry Networking"],
};

pub static INNOVATION_HUB: InnovationHub = InnovationHub {
    research_centers: &[
        "AI & Machine Learning Lab",
        "IoT Research Center",
        "Renewable Energy Lab",
        "Robotics & Automation Lab",
        "Materials Science Lab",
    ],
    patents_filed: "50+ patents by students and faculty",
    research_grants: "Funded by DST, AICTE, and industry partners",
    publications: "100+ papers in international journals annually",
    collaborations: &["IITs", "NITs", "Industry partners", "Foreign universities"],
};

pub static STUDENT_WELFARE: Keyed<KeyValues> = Keyed(&[
    (
        "counseling",
        Keyed(&[
            ("services", "Academic counseling, Career guidance, Personal counseling, Mental health support"),
            ("availability", "Professional counselors available on campus"),
            ("contact", "counseling@thenalanda.com"),
        ]),
    ),
    (
        "health_services",
        Keyed(&[
            ("medical_center", "24x7 medical facility with resident doctor"),
            ("ambulance", "Emergency ambulance service"),
            ("insurance", "Group medical insurance for students"),
            ("pharmacy", "On-campus pharmacy"),
        ]),
    ),
    (
        "anti_ragging",
        Keyed(&[
            ("policy", "Strict anti-ragging policy enforced"),
            ("committee", "Anti-Ragging Committee active"),
            ("helpline", "24x7 helpline number"),
            ("status", "Ragging-free campus certified"),
        ]),
    ),
    (
        "grievance_redressal",
        Keyed(&[
            ("committee", "Student Grievance Committee"),
            ("online_portal", "Anonymous grievance submission available"),
            ("response_time", "Within 48 hours"),
        ]),
    ),
]);

pub static TRANSPORTATION: Keyed<KeyValues> = Keyed(&[
    (
        "bus_service",
        Keyed(&[
            ("routes", "25+ bus routes covering Bhubaneswar and nearby areas"),
            ("frequency", "Morning and evening services"),
            ("fare", "Subsidized rates for students"),
        ]),
    ),
    (
        "railway_connectivity",
        Keyed(&[
            ("nearest_station", "Bhubaneswar Railway Station (15 km)"),
            ("major_connections", "Connected to all major cities"),
        ]),
    ),
    (
        "airport",
        Keyed(&[
            ("nearest_airport", "Biju Patnaik International Airport (12 km)"),
            ("connectivity", "Well connected by road"),
        ]),
    ),
]);

pub static DINING_FACILITIES: Dining = Dining {
    mess: Keyed(&[
        ("types", "Vegetarian and Non-vegetarian mess"),
        ("menu", "Weekly rotating menu with variety"),
        ("hygiene", "FSSAI certified kitchens"),
        ("special_diet", "Jain food and special dietary requirements available"),
    ]),
    cafeteria: &[
        "Multiple food courts on campus",
        "Popular chains: Dominos, KFC, Cafe Coffee Day",
        "Snacks and beverages available",
        "Student hangout zones",
    ],
    night_canteen: Keyed(&[
        ("timing", "Open till 2 AM"),
        ("for", "Students during exams and project work"),
    ]),
};

/// Names accepted by [`section`], in display order.
pub const SECTIONS: &[&str] = &[
    "college",
    "contact",
    "departments",
    "facilities",
    "admissions",
    "academics",
    "placement",
    "student_support",
    "research",
    "alumni",
    "quick_answers",
    "events",
    "faculty",
    "alumni_success",
    "innovation",
    "welfare",
    "transportation",
    "dining",
];

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        warn!("Failed to serialize knowledge base entry: {}", e);
        Value::Null
    })
}

/// Returns any named section, or `None` for an unknown name.
pub fn section(name: &str) -> Option<Value> {
    let value = match name {
        "college" | "all" => to_json(&COLLEGE_INFO),
        "contact" => to_json(&COLLEGE_INFO.contact),
        "departments" => to_json(DEPARTMENTS),
        "facilities" => to_json(&FACILITIES),
        "admissions" => to_json(&ADMISSIONS),
        "academics" => to_json(&ACADEMICS),
        "placement" => to_json(&PLACEMENT),
        "student_support" => to_json(&STUDENT_SUPPORT),
        "research" => to_json(&RESEARCH),
        "alumni" => to_json(&ALUMNI),
        "quick_answers" => to_json(&QUICK_ANSWERS),
        "events" => to_json(&EVENTS_CALENDAR),
        "faculty" => to_json(&FACULTY_INFO),
        "alumni_success" => to_json(&ALUMNI_SUCCESS),
        "innovation" => to_json(&INNOVATION_HUB),
        "welfare" => to_json(&STUDENT_WELFARE),
        "transportation" => to_json(&TRANSPORTATION),
        "dining" => to_json(&DINING_FACILITIES),
        _ => return None,
    };
    Some(value)
}

/// Returns information by query type; anything unrecognised yields the general college record.
pub fn college_info(query_type: &str) -> Value {
    match query_type {
        "contact" | "admissions" | "facilities" | "placement" | "departments" => {
            section(query_type).unwrap_or_else(|| to_json(&COLLEGE_INFO))
        }
        _ => to_json(&COLLEGE_INFO),
    }
}

const DEPARTMENT_WORDS: &[&str] = &["department", "course", "program", "branch"];
const FACILITY_WORDS: &[&str] = &["facility", "hostel", "library", "lab", "campus"];
const ADMISSION_WORDS: &[&str] = &["admission", "eligibility", "apply", "fee"];
const PLACEMENT_WORDS: &[&str] = &["placement", "job", "career", "internship"];

/// Searches the knowledge base for keyword hits.
///
/// Quick answers match when a keyword is contained in their key; the broader
/// sections match when a keyword equals one of their trigger words. With no
/// hit a single fallback entry carrying the general college record is returned.
pub fn search<S: AsRef<str>>(keywords: &[S]) -> Vec<Value> {
    let keywords: Vec<String> = keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    let mut results = Vec::new();

    for (key, value) in QUICK_ANSWERS.iter() {
        if keywords.iter().any(|k| key.contains(k.as_str())) {
            results.push(json!({ *key: value }));
        }
    }

    let any_of = |words: &[&str]| keywords.iter().any(|k| words.contains(&k.as_str()));
    if any_of(DEPARTMENT_WORDS) {
        results.push(json!({ "departments": to_json(DEPARTMENTS) }));
    }
    if any_of(FACILITY_WORDS) {
        results.push(json!({ "facilities": to_json(&FACILITIES) }));
    }
    if any_of(ADMISSION_WORDS) {
        results.push(json!({ "admissions": to_json(&ADMISSIONS) }));
    }
    if any_of(PLACEMENT_WORDS) {
        results.push(json!({ "placement": to_json(&PLACEMENT) }));
    }

    if results.is_empty() {
        results.push(json!({
            "info": "No specific match found",
            "general": to_json(&COLLEGE_INFO),
        }));
    }
    results
}

/// Departments offering the given program (e.g. "PhD").
pub fn departments_offering(program: &str) -> Vec<&'static Department> {
    DEPARTMENTS
        .iter()
        .filter(|d| d.programs.iter().any(|p| p.eq_ignore_ascii_case(program)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_college_info_contact() {
        let contact = college_info("contact");
        assert_eq!(contact["email"], "info@thenalanda.com");
        assert_eq!(contact["phone"], "+91 99371 65074");
    }

    #[test]
    fn test_college_info_unknown_defaults_to_general() {
        let info = college_info("something-else");
        assert_eq!(info["name"], COLLEGE_INFO.name);
        assert_eq!(info["accreditation"], "NAAC A+ Accredited");
    }

    #[test]
    fn test_keyed_serializes_in_order() {
        let fees = serde_json::to_string(&ADMISSIONS.fee_structure).unwrap();
        let btech = fees.find("B.Tech_per_year").unwrap();
        let modes = fees.find("payment_modes").unwrap();
        assert!(btech < modes);
    }

    #[test]
    fn test_eligibility_keyed_by_program() {
        let admissions = section("admissions").unwrap();
        assert_eq!(
            admissions["eligibility"]["PhD"]["age_limit"],
            "As per UGC norms"
        );
        assert_eq!(ADMISSIONS.eligibility.len(), 3);
        assert!(ADMISSIONS.eligibility.get("M.Tech").is_some());
    }

    #[test]
    fn test_department_type_renamed() {
        let departments = section("departments").unwrap();
        assert_eq!(departments.as_array().unwrap().len(), 7);
        assert_eq!(departments[0]["type"], "Engineering");
    }

    #[test]
    fn test_every_listed_section_resolves() {
        for name in SECTIONS {
            assert!(section(name).is_some(), "section {} missing", name);
        }
        assert!(section("cafeteria").is_none());
    }

    #[test]
    fn test_search_quick_answer_substring() {
        let results = search(&["mail"]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["email"], "info@thenalanda.com");
    }

    #[test]
    fn test_search_sections_case_insensitive() {
        let results = search(&["Hostel", "FEE"]);
        assert!(results.iter().any(|r| r.get("facilities").is_some()));
        assert!(results.iter().any(|r| r.get("admissions").is_some()));
        assert!(!results.iter().any(|r| r.get("placement").is_some()));
    }

    #[test]
    fn test_search_quick_answers_come_first() {
        let results = search(&["program"]);
        // "programs" quick answer, then departments.
        assert_eq!(results[0]["programs"], "150+ programs offered");
        assert!(results[1].get("departments").is_some());
    }

    #[test]
    fn test_search_no_match_fallback() {
        let results = search(&["zebra"]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["info"], "No specific match found");
        assert_eq!(results[0]["general"]["name"], COLLEGE_INFO.name);
    }

    #[test]
    fn test_departments_offering_phd() {
        let phd = departments_offering("phd");
        assert_eq!(phd.len(), 1);
        assert_eq!(phd[0].name, "Computer Science & Engineering");
    }
}
