//! Alerting contacts (`/alerting/contacts`).

use crate::error::Error;
use crate::request::{PingdomResponse, Requester};
use reqwest::Method;
use serde::{Deserialize, Serialize};

const SEVERITIES: [&str; 2] = ["HIGH", "LOW"];

/// Payload for creating or updating a contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub notification_targets: NotificationTargets,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationTargets {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sms: Vec<SmsNotification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub email: Vec<EmailNotification>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmsNotification {
    pub country_code: String,
    pub number: String,
    /// `HIGH` or `LOW`.
    pub severity: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provider: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailNotification {
    pub address: String,
    /// `HIGH` or `LOW`.
    pub severity: String,
}

impl Contact {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() {
            return Err(Error::validation("name", "must contain non-empty string"));
        }
        let targets = &self.notification_targets;
        if targets.sms.is_empty() && targets.email.is_empty() {
            return Err(Error::validation(
                "notification_targets",
                "at least one SMS or email target is required",
            ));
        }
        for sms in &targets.sms {
            if sms.number.is_empty() {
                return Err(Error::validation("number", "must contain non-empty string"));
            }
            if sms.country_code.is_empty() {
                return Err(Error::validation(
                    "country_code",
                    "must contain non-empty string",
                ));
            }
            validate_severity(&sms.severity)?;
        }
        for email in &targets.email {
            if email.address.is_empty() {
                return Err(Error::validation("address", "must contain non-empty string"));
            }
            validate_severity(&email.severity)?;
        }
        Ok(())
    }
}

fn validate_severity(severity: &str) -> Result<(), Error> {
    if SEVERITIES.contains(&severity) {
        return Ok(());
    }
    Err(Error::validation(
        "severity",
        format!("{:?} is not one of {:?}", severity, SEVERITIES),
    ))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactTeam {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub owner: bool,
    #[serde(default, rename = "type")]
    pub contact_type: String,
    #[serde(default)]
    pub teams: Vec<ContactTeam>,
    #[serde(default)]
    pub notification_targets: NotificationTargets,
}

#[derive(Deserialize)]
struct ListContactsJson {
    #[serde(default)]
    contacts: Vec<ContactResponse>,
}

#[derive(Deserialize)]
struct ContactDetailsJson {
    contact: ContactResponse,
}

/// Operations on `/alerting/contacts`.
pub struct ContactService<'a, R: ?Sized> {
    api: &'a R,
}

impl<'a, R: Requester + ?Sized> ContactService<'a, R> {
    pub fn new(api: &'a R) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<ContactResponse>, Error> {
        let req = self
            .api
            .new_request(Method::GET, "/alerting/contacts", None)?;
        let body: ListContactsJson = self.api.send(req).await?.json()?;
        Ok(body.contacts)
    }

    pub async fn read(&self, id: i64) -> Result<ContactResponse, Error> {
        let req = self
            .api
            .new_request(Method::GET, &format!("/alerting/contacts/{}", id), None)?;
        let body: ContactDetailsJson = self.api.send(req).await?.json()?;
        Ok(body.contact)
    }

    /// Create a contact; the result carries only the new `id`.
    pub async fn create(&self, contact: &Contact) -> Result<ContactResponse, Error> {
        contact.validate()?;
        let body = serde_json::to_string(contact)?;
        let req = self
            .api
            .new_json_request(Method::POST, "/alerting/contacts", body)?;
        let body: ContactDetailsJson = self.api.send(req).await?.json()?;
        Ok(body.contact)
    }

    pub async fn update(&self, id: i64, contact: &Contact) -> Result<PingdomResponse, Error> {
        contact.validate()?;
        let body = serde_json::to_string(contact)?;
        let req = self.api.new_json_request(
            Method::PUT,
            &format!("/alerting/contacts/{}", id),
            body,
        )?;
        self.api.send(req).await?.json()
    }

    pub async fn delete(&self, id: i64) -> Result<PingdomResponse, Error> {
        let req = self
            .api
            .new_request(Method::DELETE, &format!("/alerting/contacts/{}", id), None)?;
        self.api.send(req).await?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRequester;

    fn contact() -> Contact {
        Contact {
            name: "John Doe".into(),
            paused: false,
            notification_targets: NotificationTargets {
                sms: vec![SmsNotification {
                    country_code: "00".into(),
                    number: "111111111".into(),
                    severity: "HIGH".into(),
                    provider: "nexmo".into(),
                }],
                email: vec![EmailNotification {
                    address: "john@example.com".into(),
                    severity: "LOW".into(),
                }],
            },
        }
    }

    #[test]
    fn validate_contact() {
        assert!(contact().validate().is_ok());

        let mut c = contact();
        c.notification_targets = NotificationTargets::default();
        assert!(matches!(
            c.validate(),
            Err(Error::Validation {
                field: "notification_targets",
                ..
            })
        ));

        let mut c = contact();
        c.notification_targets.email[0].severity = "MEDIUM".into();
        assert!(matches!(
            c.validate(),
            Err(Error::Validation {
                field: "severity",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn create_posts_json() {
        let api = MockRequester::new().respond(200, r#"{"contact":{"id":1}}"#);
        let created = ContactService::new(&api).create(&contact()).await.unwrap();
        assert_eq!(created.id, 1);

        let sent = api.last();
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.path, "/alerting/contacts");
        let body = sent.json();
        assert_eq!(body["name"], "John Doe");
        assert_eq!(body["notification_targets"]["sms"][0]["number"], "111111111");
        assert_eq!(body["notification_targets"]["email"][0]["severity"], "LOW");
    }

    #[tokio::test]
    async fn list_and_read() {
        let api = MockRequester::new()
            .respond(
                200,
                r#"{"contacts":[{"id":1,"name":"John Doe","paused":false,"type":"user","owner":true,
                    "notification_targets":{"email":[{"severity":"HIGH","address":"john@example.com"}]},
                    "teams":[{"id":3,"name":"Ops"}]}]}"#,
            )
            .respond(200, r#"{"contact":{"id":1,"name":"John Doe","type":"user"}}"#);
        let svc = ContactService::new(&api);

        let contacts = svc.list().await.unwrap();
        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].owner);
        assert_eq!(contacts[0].teams[0].name, "Ops");
        assert_eq!(
            contacts[0].notification_targets.email[0].address,
            "john@example.com"
        );

        let one = svc.read(1).await.unwrap();
        assert_eq!(one.contact_type, "user");
        assert_eq!(api.last().path, "/alerting/contacts/1");
    }

    #[tokio::test]
    async fn update_and_delete() {
        let api = MockRequester::new()
            .respond(200, r#"{"message":"Modification of contact was successful!"}"#)
            .respond(200, r#"{"message":"Deletion of contact was successful!"}"#);
        let svc = ContactService::new(&api);
        svc.update(1, &contact()).await.unwrap();
        let msg = svc.delete(1).await.unwrap();
        assert_eq!(msg.message, "Deletion of contact was successful!");
        let sent = api.sent();
        assert_eq!(sent[0].method, Method::PUT);
        assert_eq!(sent[1].method, Method::DELETE);
        assert_eq!(sent[1].path, "/alerting/contacts/1");
    }
}
