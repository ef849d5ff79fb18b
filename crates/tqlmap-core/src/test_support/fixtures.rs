use crate::{
    db::response::Row,
    error::InternalError,
    model::{AttributeModel, ModelRegistry, RoleModel, TypeModel, ValueKind},
    traits::{Model, ModelValue},
    value::Value,
};

// ---------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------

static PERSON_ATTRS: &[AttributeModel] = &[
    AttributeModel::new("name", ValueKind::String).key(),
    AttributeModel::new("age", ValueKind::Integer).optional(),
    AttributeModel::new("email", ValueKind::String)
        .optional()
        .unique(),
    AttributeModel::new("tags", ValueKind::String).multi(),
];

static STUDENT_ATTRS: &[AttributeModel] = &[
    AttributeModel::new("name", ValueKind::String).key(),
    AttributeModel::new("school", ValueKind::String).optional(),
];

static COMPANY_ATTRS: &[AttributeModel] = &[AttributeModel::new("name", ValueKind::String).key()];

static EMPLOYMENT_ROLES: &[RoleModel] = &[
    RoleModel::new("employee", "person"),
    RoleModel::new("employer", "company"),
];

static EMPLOYMENT_ATTRS: &[AttributeModel] = &[
    AttributeModel::new("title", ValueKind::String).optional(),
    AttributeModel::new("start-date", ValueKind::Date).optional(),
];

static LOG_LINE_ATTRS: &[AttributeModel] = &[AttributeModel::new("message", ValueKind::String)];

pub static PERSON: TypeModel = TypeModel::entity("person", PERSON_ATTRS);
pub static STUDENT: TypeModel = TypeModel::entity("student", STUDENT_ATTRS).sub("person");
pub static COMPANY: TypeModel = TypeModel::entity("company", COMPANY_ATTRS);
pub static EMPLOYMENT: TypeModel =
    TypeModel::relation("employment", EMPLOYMENT_ROLES, EMPLOYMENT_ATTRS);
pub static LOG_LINE: TypeModel = TypeModel::entity("log-line", LOG_LINE_ATTRS);

/// Registry with every fixture type.
#[must_use]
pub fn registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    for model in [&PERSON, &STUDENT, &COMPANY, &EMPLOYMENT, &LOG_LINE] {
        registry.register(model).expect("fixture models are distinct");
    }

    registry
}

// ---------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Person {
    pub id: Option<String>,
    pub name: String,
    pub age: Option<i64>,
    pub email: Option<String>,
    pub tags: Vec<String>,
}

impl Person {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

impl ModelValue for Person {
    fn model(&self) -> &'static TypeModel {
        &PERSON
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn values(&self, attr: &str) -> Vec<Value> {
        match attr {
            "name" => vec![Value::from(&self.name)],
            "age" => self.age.map(Value::from).into_iter().collect(),
            "email" => self.email.iter().map(Value::from).collect(),
            "tags" => self.tags.iter().map(Value::from).collect(),
            _ => Vec::new(),
        }
    }
}

impl Model for Person {
    const MODEL: &'static TypeModel = &PERSON;

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn hydrate(row: &Row) -> Result<Self, InternalError> {
        Ok(Self {
            id: row.id(),
            name: row.require_text("name")?.to_string(),
            age: row.int("age"),
            email: row.text("email").map(str::to_string),
            tags: row.texts("tags").into_iter().map(str::to_string).collect(),
        })
    }
}

// ---------------------------------------------------------------------
// Company
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Company {
    pub id: Option<String>,
    pub name: String,
}

impl Company {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
        }
    }
}

impl ModelValue for Company {
    fn model(&self) -> &'static TypeModel {
        &COMPANY
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn values(&self, attr: &str) -> Vec<Value> {
        match attr {
            "name" => vec![Value::from(&self.name)],
            _ => Vec::new(),
        }
    }
}

impl Model for Company {
    const MODEL: &'static TypeModel = &COMPANY;

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn hydrate(row: &Row) -> Result<Self, InternalError> {
        Ok(Self {
            id: row.id(),
            name: row.require_text("name")?.to_string(),
        })
    }
}

// ---------------------------------------------------------------------
// Employment
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Employment {
    pub id: Option<String>,
    pub employee: Option<Person>,
    pub employer: Option<Company>,
    pub title: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
}

impl ModelValue for Employment {
    fn model(&self) -> &'static TypeModel {
        &EMPLOYMENT
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn values(&self, attr: &str) -> Vec<Value> {
        match attr {
            "title" => self.title.iter().map(Value::from).collect(),
            "start-date" => self.start_date.map(Value::from).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    fn role_player(&self, role: &str) -> Option<&dyn ModelValue> {
        match role {
            "employee" => self.employee.as_ref().map(|p| p as &dyn ModelValue),
            "employer" => self.employer.as_ref().map(|c| c as &dyn ModelValue),
            _ => None,
        }
    }
}

impl Model for Employment {
    const MODEL: &'static TypeModel = &EMPLOYMENT;

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn hydrate(row: &Row) -> Result<Self, InternalError> {
        Ok(Self {
            id: row.id(),
            employee: row.nested("employee").map(|r| Person::hydrate(&r)).transpose()?,
            employer: row.nested("employer").map(|r| Company::hydrate(&r)).transpose()?,
            title: row.text("title").map(str::to_string),
            start_date: row.date("start-date"),
        })
    }
}

// ---------------------------------------------------------------------
// LogLine
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogLine {
    pub id: Option<String>,
    pub message: String,
}

impl ModelValue for LogLine {
    fn model(&self) -> &'static TypeModel {
        &LOG_LINE
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn values(&self, attr: &str) -> Vec<Value> {
        match attr {
            "message" => vec![Value::from(&self.message)],
            _ => Vec::new(),
        }
    }
}

impl Model for LogLine {
    const MODEL: &'static TypeModel = &LOG_LINE;

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn hydrate(row: &Row) -> Result<Self, InternalError> {
        Ok(Self {
            id: row.id(),
            message: row.require_text("message")?.to_string(),
        })
    }
}
