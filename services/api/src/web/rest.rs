//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use promptt_core::protocol::{
    AuthResponseBody, CreatePromptBody, CreatedBody, CredentialsBody, ErrorBody,
    FavoritePatchBody, GenerateRequestBody, GenerateResponseBody, PasswordChangeBody,
    PromptRecordBody, UsageBody,
};
use utoipa::OpenApi;

use crate::web::{auth, generate, prompts, usage};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate::generate_prompt_handler,
        prompts::create_prompt_handler,
        prompts::list_prompts_handler,
        prompts::update_favorite_handler,
        prompts::delete_prompt_handler,
        usage::usage_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        auth::change_password_handler,
    ),
    components(
        schemas(
            GenerateRequestBody,
            GenerateResponseBody,
            ErrorBody,
            CreatePromptBody,
            CreatedBody,
            FavoritePatchBody,
            PromptRecordBody,
            UsageBody,
            CredentialsBody,
            AuthResponseBody,
            PasswordChangeBody
        )
    ),
    tags(
        (name = "Promptt API", description = "Prompt generation gateway, prompt history and sessions.")
    )
)]
pub struct ApiDoc;
