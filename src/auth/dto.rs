use serde::Deserialize;

// Field names mirror the HTML form inputs, hyphens included.

#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    #[serde(rename = "first-name")]
    pub first_name: String,
    #[serde(rename = "last-name")]
    pub last_name: String,
    pub user_email: String,
    #[serde(rename = "set-password")]
    pub password: String,
    #[serde(rename = "confirm-password")]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub user_email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct EditUserForm {
    #[serde(rename = "first-name")]
    pub first_name: String,
    #[serde(rename = "last-name")]
    pub last_name: String,
    pub bio: String,
    pub avatar: String,
}
