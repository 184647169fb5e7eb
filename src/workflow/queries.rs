//! 表单遍历使用的感知查询

pub const APPLY_ENTRY: &str = "Find the 'Apply', 'Apply Now' or 'Postuler' button that opens the job application form. Do NOT select Next, Continue or other navigation buttons.";

pub const VALIDATION_ERRORS: &str = "Find any error messages or validation warnings on the form";

pub const FIX_VALIDATION: &str = "Fix the validation errors by re-entering correct values from the applicant information";

pub const SIGN_IN_WALL: &str = "Find a mandatory sign-in or create-account wall that blocks the application form";

pub const GUEST_BYPASS: &str = "Find a 'Continue as guest', 'Apply without an account' or 'Skip' option that bypasses sign-in";

pub const CAPTCHA: &str = "Find any CAPTCHA challenge, reCAPTCHA or hCaptcha widget, or 'I am not a robot' checkbox";

pub const CONSENT_CHECKBOXES: &str = "Find unchecked checkboxes for accepting terms and conditions, privacy policy or data processing consent";

pub const TEXT_FIELDS: &str = "Find all unfilled text input fields (name, email, phone, address, dates, URLs and similar)";

pub const TEXTAREA_FIELDS: &str = "Find all empty textarea fields for longer answers";

pub const DROPDOWN_FIELDS: &str = "Find all dropdown or select fields that have no option selected yet";

pub const RADIO_GROUPS: &str = "Find all radio button questions that have no option selected yet";

pub const CHECKBOX_FIELDS: &str = "Find all unchecked checkboxes that are required or that answer a question";

pub const SUBMIT_CONTROL: &str = "Find the final 'Submit', 'Submit Application' or 'Soumettre' button that sends the application (not Next or Continue)";

pub const SUBMIT_RETRY: &str = "Find a submit button";

pub const NEXT_CONTROL: &str = "Find the 'Next', 'Continue', 'Suivant' or 'Save and continue' button that moves to the next step of the form";
