//! User management with inline role editing.

use async_trait::async_trait;

use super::{show_load_error, unknown_action, Page};
use crate::actions::{ActionEvent, PageAction};
use crate::cache::CollectionCache;
use crate::dom::{action_button, badge, empty_state, escape_html, inline_error, select_options};
use crate::errors::ApiError;
use crate::generation::Generation;
use crate::models::{CreateUserRequest, Role, User, UserUpdate};
use crate::search::matches_query;
use crate::PageContext;

pub const ROUTE: &str = "admin/users";

pub const TABLE_BODY: &str = "usersTableBody";
pub const SEARCH: &str = "userSearch";
pub const CREATE_MODAL: &str = "createUserModal";
pub const NEW_USERNAME: &str = "newUsername";
pub const NEW_FULL_NAME: &str = "newFullName";
pub const NEW_EMAIL: &str = "newEmail";
pub const NEW_PASSWORD: &str = "newPassword";
pub const NEW_ROLE: &str = "newRole";
pub const FORM_ERROR: &str = "userFormError";

pub const MIN_PASSWORD_LEN: usize = 8;

const COLUMNS: usize = 7;

/// Id of the inline role select for a user row.
pub fn role_select_id(username: &str) -> String {
    format!("role-{}", username)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Search(Option<String>),
    SaveRole(String),
    ToggleDisabled(String),
    ResetPassword(String),
    OpenCreate,
    CreateUser,
    Delete(String),
}

impl PageAction for UserAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        let username = || event.id.clone().filter(|id| !id.is_empty());
        match event.action.as_str() {
            "search" => Some(UserAction::Search(event.value.clone())),
            "save-role" => username().map(UserAction::SaveRole),
            "toggle-disabled" => username().map(UserAction::ToggleDisabled),
            "reset-password" => username().map(UserAction::ResetPassword),
            "open-create" => Some(UserAction::OpenCreate),
            "create-user" => Some(UserAction::CreateUser),
            "delete" => username().map(UserAction::Delete),
            _ => None,
        }
    }
}

pub struct UsersPage {
    ctx: PageContext,
    users: CollectionCache<User>,
    search: String,
    generation: Generation,
}

impl UsersPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            users: CollectionCache::new(),
            search: String::new(),
            generation: Generation::new(),
        }
    }

    pub fn users(&self) -> &[User] {
        self.users.items()
    }

    pub fn visible(&self) -> Vec<&User> {
        self.users
            .items()
            .iter()
            .filter(|u| {
                matches_query(
                    &self.search,
                    [
                        u.username.as_str(),
                        u.full_name.as_deref().unwrap_or(""),
                        u.email.as_deref().unwrap_or(""),
                    ],
                )
            })
            .collect()
    }

    pub async fn reload(&mut self) {
        let ticket = self.generation.advance();
        let result = self.ctx.api.list_users().await;
        if !ticket.is_current() {
            tracing::debug!(page = ROUTE, "Discarding superseded user list");
            return;
        }

        match result {
            Ok(users) => {
                tracing::info!(page = ROUTE, count = users.len(), "Users loaded");
                self.users.replace(users);
                self.render();
            }
            Err(e) => show_load_error(&self.ctx, TABLE_BODY, "users", &e),
        }
    }

    pub async fn dispatch(&mut self, action: UserAction) {
        let result = match &action {
            UserAction::Search(query) => {
                self.search = query
                    .clone()
                    .unwrap_or_else(|| self.ctx.value(SEARCH))
                    .trim()
                    .to_string();
                self.render();
                Ok(())
            }
            UserAction::SaveRole(username) => self.save_role(username).await,
            UserAction::ToggleDisabled(username) => self.toggle_disabled(username).await,
            UserAction::ResetPassword(username) => self.reset_password(username).await,
            UserAction::OpenCreate => {
                self.open_create();
                Ok(())
            }
            UserAction::CreateUser => self.create_user().await,
            UserAction::Delete(username) => self.delete(username).await,
        };

        if let Err(e) = result {
            let what = match action {
                UserAction::SaveRole(_) => "Failed to update role",
                UserAction::ToggleDisabled(_) => "Failed to update user",
                UserAction::ResetPassword(_) => "Failed to reset password",
                UserAction::CreateUser => "Failed to create user",
                UserAction::Delete(_) => "Failed to delete user",
                _ => "User action failed",
            };
            self.ctx.report(what, &e);
        }
    }

    fn render(&self) {
        let html = if self.users.is_empty() {
            table_placeholder("No users found.")
        } else {
            let visible = self.visible();
            if visible.is_empty() {
                table_placeholder("No users match your search.")
            } else {
                visible.into_iter().map(render_row).collect()
            }
        };

        let mut document = self.ctx.document.lock();
        document.set_html(TABLE_BODY, html);
        for user in self.users.items() {
            document.set_value(&role_select_id(&user.username), user.role.as_str());
        }
    }

    async fn save_role(&mut self, username: &str) -> Result<(), ApiError> {
        let raw = self.ctx.value(&role_select_id(username));
        let Some(role) = Role::parse(&raw) else {
            self.ctx.toasts.danger("Please choose a valid role.");
            return Ok(());
        };

        let update = UserUpdate {
            role: Some(role),
            disabled: None,
        };
        let updated = self.ctx.api.update_user(username, &update).await?;
        tracing::info!(page = ROUTE, username = %updated.username, role = role.as_str(), "Role updated");

        let message = format!("Role updated for {}.", updated.username);
        self.patch(updated);
        self.ctx.toasts.success(&message);
        Ok(())
    }

    async fn toggle_disabled(&mut self, username: &str) -> Result<(), ApiError> {
        let Some(currently_disabled) = self
            .users
            .get(&username.to_string())
            .map(|u| u.disabled)
        else {
            self.ctx.toasts.danger("User not found.");
            return Ok(());
        };

        if !currently_disabled
            && !self.ctx.browser.confirm(&format!(
                "Are you sure you want to disable user {}?",
                username
            ))
        {
            return Ok(());
        }

        let update = UserUpdate {
            role: None,
            disabled: Some(!currently_disabled),
        };
        let updated = self.ctx.api.update_user(username, &update).await?;
        tracing::info!(page = ROUTE, username = %updated.username, disabled = updated.disabled, "Account status changed");

        self.patch(updated);
        Ok(())
    }

    async fn reset_password(&mut self, username: &str) -> Result<(), ApiError> {
        let Some(password) = self.ctx.browser.prompt(&format!(
            "Enter a new password for {} (at least {} characters):",
            username, MIN_PASSWORD_LEN
        )) else {
            return Ok(());
        };

        if password.chars().count() < MIN_PASSWORD_LEN {
            self.ctx.toasts.danger(&format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LEN
            ));
            return Ok(());
        }

        self.ctx.api.reset_password(username, &password).await?;
        tracing::info!(page = ROUTE, username, "Password reset");
        self.ctx
            .toasts
            .success(&format!("Password reset for {}.", username));
        Ok(())
    }

    fn open_create(&self) {
        let mut document = self.ctx.document.lock();
        document.clear_inputs(&[NEW_USERNAME, NEW_FULL_NAME, NEW_EMAIL, NEW_PASSWORD]);
        document.set_value(NEW_ROLE, Role::default().as_str());
        document.set_html(NEW_ROLE, select_options(
            Role::ALL.iter().map(|r| (r.as_str(), r.label())),
            Role::default().as_str(),
        ));
        document.set_html(FORM_ERROR, "");
        document.show(CREATE_MODAL);
    }

    async fn create_user(&mut self) -> Result<(), ApiError> {
        let (username, full_name, email, password, role) = {
            let document = self.ctx.document.lock();
            (
                document.trimmed_value(NEW_USERNAME),
                document.trimmed_value(NEW_FULL_NAME),
                document.trimmed_value(NEW_EMAIL),
                document.value(NEW_PASSWORD),
                document.value(NEW_ROLE),
            )
        };

        if username.is_empty() || email.is_empty() || password.is_empty() {
            self.ctx.set_html(
                FORM_ERROR,
                inline_error("Username, email and password are required."),
            );
            return Ok(());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            self.ctx.set_html(
                FORM_ERROR,
                inline_error(&format!(
                    "Password must be at least {} characters.",
                    MIN_PASSWORD_LEN
                )),
            );
            return Ok(());
        }

        let request = CreateUserRequest {
            username,
            password,
            email,
            full_name: (!full_name.is_empty()).then_some(full_name),
            role: Role::parse(&role).unwrap_or_default(),
        };
        let created = self.ctx.api.create_user(&request).await?;
        tracing::info!(page = ROUTE, username = %created.username, "User created");

        {
            let mut document = self.ctx.document.lock();
            document.clear_inputs(&[NEW_USERNAME, NEW_FULL_NAME, NEW_EMAIL, NEW_PASSWORD]);
            document.set_html(FORM_ERROR, "");
            document.hide(CREATE_MODAL);
        }
        self.ctx
            .toasts
            .success(&format!("User {} created.", created.username));
        self.reload().await;
        Ok(())
    }

    async fn delete(&mut self, username: &str) -> Result<(), ApiError> {
        if !self.ctx.browser.confirm(&format!(
            "Are you sure you want to delete user {}?",
            username
        )) {
            return Ok(());
        }

        self.ctx.api.delete_user(username).await?;
        tracing::info!(page = ROUTE, username, "User deleted");

        self.ctx.toasts.success(&format!("User {} deleted.", username));
        self.reload().await;
        Ok(())
    }

    fn patch(&mut self, user: User) {
        let username = user.username.clone();
        if !self.users.patch(user) {
            tracing::warn!(page = ROUTE, username = %username, "Updated user is no longer cached");
        }
        self.render();
    }
}

#[async_trait]
impl Page for UsersPage {
    fn route(&self) -> &'static str {
        ROUTE
    }

    async fn load(&mut self) {
        self.reload().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        match UserAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(ROUTE, event),
        }
    }
}

fn table_placeholder(message: &str) -> String {
    format!(
        r#"<tr><td colspan="{}">{}</td></tr>"#,
        COLUMNS,
        empty_state(message)
    )
}

fn render_row(user: &User) -> String {
    let status = if user.disabled {
        badge("Disabled", "bg-danger")
    } else {
        badge("Active", "bg-success")
    };
    let toggle_label = if user.disabled { "Enable" } else { "Disable" };
    let last_login = user
        .last_login
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "Never".to_string());

    format!(
        r#"<tr class="user-row" data-id="{id}"><td>{username}</td><td>{full_name}</td><td>{email}</td><td><select id="{select_id}" class="form-select form-select-sm">{roles}</select></td><td>{status}</td><td>{last_login}</td><td>{save} {toggle} {reset} {delete}</td></tr>"#,
        id = escape_html(&user.username),
        username = escape_html(&user.username),
        full_name = escape_html(user.full_name.as_deref().unwrap_or("")),
        email = escape_html(user.email.as_deref().unwrap_or("")),
        select_id = escape_html(&role_select_id(&user.username)),
        roles = select_options(
            Role::ALL.iter().map(|r| (r.as_str(), r.label())),
            user.role.as_str()
        ),
        status = status,
        last_login = last_login,
        save = action_button("Save role", "btn-sm btn-primary", "save-role", &user.username),
        toggle = action_button(
            toggle_label,
            "btn-sm btn-outline-warning",
            "toggle-disabled",
            &user.username
        ),
        reset = action_button(
            "Reset password",
            "btn-sm btn-outline-secondary",
            "reset-password",
            &user.username
        ),
        delete = action_button("Delete", "btn-sm btn-outline-danger", "delete", &user.username),
    )
}
