//! Chromium-driven judge session.
//!
//! Talks to the judge's web UI over the DevTools protocol: GitHub-based
//! login, scraping the statement and the editor template, driving the
//! Monaco editor through JavaScript, and polling the result banner.

use std::time::Duration;

use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use leetweaver_sdk::{async_trait, log_info, log_warning};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{
    build_submission_result, with_retries, JudgeConnector, JudgeError, JudgeSession, ProblemDetails,
    ResultPanel, DEFAULT_WAIT, LOGIN_URL, RETRY_ATTEMPTS, RETRY_DELAY, SHORT_WAIT, VERDICT_WAIT,
};
use crate::config::{Config, Credentials};
use crate::solver::parsing::normalize_blank_lines;
use crate::solver::types::{Language, SubmissionResult};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

const DESCRIPTION_SELECTOR: &str = r#"div[data-track-load="description_content"]"#;
const EDITOR_LINE_SELECTOR: &str = ".view-line";
const EDITOR_SELECTOR: &str = ".monaco-editor textarea";
const LANGUAGE_BUTTON_SELECTOR: &str = "button.text-sm.font-normal.group";
const SUBMIT_SELECTOR: &str = r#"button[data-e2e-locator="console-submit-button"]"#;
const RUN_SELECTOR: &str = r#"button[data-e2e-locator="console-run-button"]"#;
const PROFILE_SELECTOR: &str = "img.h-6.w-6.cursor-pointer.rounded-full";
const GITHUB_LOGIN_SELECTOR: &str = r#"a[href*="github/login"]"#;
const GITHUB_USERNAME_SELECTOR: &str = "#login_field";
const GITHUB_PASSWORD_SELECTOR: &str = "#password";
const GITHUB_SIGN_IN_SELECTOR: &str = r#"input[type="submit"][value="Sign in"]"#;

const READ_EDITOR_SCRIPT: &str = r#"(() => {
    try {
        const editor = monaco.editor.getEditors()[0];
        return editor ? editor.getValue() : "";
    } catch (e) {
        return "";
    }
})()"#;

const VERDICT_SCRIPT: &str = r#"(() => {
    const verdicts = ["Accepted", "Wrong Answer", "Time Limit Exceeded", "Runtime Error",
                      "Compile Error", "Memory Limit Exceeded"];
    const nodes = document.querySelectorAll(
        '[data-e2e-locator="submission-result"], div.text-xl, span.text-red-s, span.text-green-s');
    for (const node of nodes) {
        const text = (node.innerText || "").trim();
        if (verdicts.some(v => text.includes(v))) {
            return text;
        }
    }
    return "";
})()"#;

const RUN_RESULT_SCRIPT: &str = r#"(() => {
    const verdicts = ["Accepted", "Wrong Answer", "Time Limit Exceeded", "Runtime Error",
                      "Compile Error", "Memory Limit Exceeded"];
    const nodes = document.querySelectorAll(
        '[data-e2e-locator="console-result"], div.text-green-s, div.text-red-s, div.text-error');
    for (const node of nodes) {
        const text = (node.innerText || "").trim();
        if (verdicts.some(v => text.includes(v))) {
            return text;
        }
    }
    return "";
})()"#;

const STATS_SCRIPT: &str = r#"(() => {
    const read = (label) => {
        const head = Array.from(document.querySelectorAll('div, span'))
            .find(el => el.childElementCount === 0 && el.textContent.trim() === label);
        if (!head) return null;
        const box = (head.parentElement && head.parentElement.nextElementSibling) || head.nextElementSibling;
        const text = box ? box.innerText.trim().replace(/\s+/g, ' ') : "";
        return text.length ? text : null;
    };
    return { runtime: read('Runtime'), memory: read('Memory') };
})()"#;

const PANEL_SCRIPT: &str = r#"(() => {
    const read = (label) => {
        const head = Array.from(document.querySelectorAll('div'))
            .find(el => el.childElementCount === 0 && el.textContent.trim() === label);
        if (!head || !head.nextElementSibling) return null;
        const text = head.nextElementSibling.innerText.trim();
        return text.length ? text : null;
    };
    return {
        input: read('Input') || read('Last Executed Input'),
        output: read('Output'),
        expected: read('Expected'),
        stderr: read('Stderr'),
    };
})()"#;

impl From<CdpError> for JudgeError {
    fn from(e: CdpError) -> Self {
        JudgeError::Browser(e.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
struct SubmissionStats {
    #[serde(default)]
    runtime: Option<String>,
    #[serde(default)]
    memory: Option<String>,
}

/// Launches one Chromium instance per solver run
#[derive(Debug, Clone)]
pub struct BrowserJudge {
    credentials: Credentials,
    headless: bool,
}

impl BrowserJudge {
    pub fn new(credentials: Credentials, headless: bool) -> Self {
        Self {
            credentials,
            headless,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.credentials.clone(), config.headless)
    }
}

#[async_trait]
impl JudgeConnector for BrowserJudge {
    async fn connect(&self) -> Result<Box<dyn JudgeSession>, JudgeError> {
        let session = BrowserSession::launch(self.credentials.clone(), self.headless).await?;
        Ok(Box::new(session))
    }
}

/// Page state captured just before clicking Submit or Run
#[derive(Debug, Clone, Default, PartialEq)]
struct VerdictMark {
    url: String,
    text: String,
}

/// Whether a polled banner reports the action taken after `mark` rather
/// than one left over from an earlier click.
fn is_fresh_verdict(mark: Option<&VerdictMark>, url: &str, text: &str, cleared: bool) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    match mark {
        None => true,
        Some(mark) => {
            cleared || mark.text.trim().is_empty() || mark.url != url || mark.text.trim() != text
        }
    }
}

/// A running browser with one page on the judge site
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    credentials: Credentials,
    headless: bool,
    logged_in: bool,
    closed: bool,
    pending: Option<VerdictMark>,
}

impl BrowserSession {
    async fn launch(credentials: Credentials, headless: bool) -> Result<Self, JudgeError> {
        let mut builder = BrowserConfig::builder()
            .window_size(1400, 1000)
            .arg("--disable-dev-shm-usage");
        if headless {
            builder = builder.no_sandbox().arg("--disable-gpu");
        } else {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(JudgeError::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler stopped");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        tracing::info!(headless, "browser session started");

        Ok(Self {
            browser,
            handler,
            page,
            credentials,
            headless,
            logged_in: false,
            closed: false,
            pending: None,
        })
    }

    /// Poll for an element until `timeout` elapses
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Element, JudgeError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(JudgeError::Timeout {
                    what: format!("element {}", selector),
                    after: timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn eval<T: DeserializeOwned>(&self, script: &str) -> Result<T, JudgeError> {
        self.page
            .evaluate(script)
            .await?
            .into_value::<T>()
            .map_err(|e| JudgeError::Browser(format!("unexpected script result: {}", e)))
    }

    async fn current_url(&self) -> String {
        self.page.url().await.ok().flatten().unwrap_or_default()
    }

    async fn navigate(&self, url: &str) -> Result<(), JudgeError> {
        with_retries("navigate", RETRY_ATTEMPTS, RETRY_DELAY, move || async move {
            self.page.goto(url).await?;
            Ok(())
        })
        .await
    }

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), JudgeError> {
        let element = self.wait_for(selector, timeout).await?;
        element.click().await?;
        Ok(())
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<(), JudgeError> {
        let element = self.wait_for(selector, DEFAULT_WAIT).await?;
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn is_logged_in(&self) -> bool {
        self.wait_for(PROFILE_SELECTOR, SHORT_WAIT).await.is_ok()
    }

    async fn github_login(&self) -> Result<(), JudgeError> {
        if self.credentials.username.is_empty() || self.credentials.password.is_empty() {
            return Err(JudgeError::Login("no credentials configured".to_string()));
        }

        with_retries("open GitHub login", RETRY_ATTEMPTS, RETRY_DELAY, move || {
            self.click(GITHUB_LOGIN_SELECTOR, DEFAULT_WAIT)
        })
        .await?;

        self.type_into(GITHUB_USERNAME_SELECTOR, &self.credentials.username)
            .await?;
        self.type_into(GITHUB_PASSWORD_SELECTOR, &self.credentials.password)
            .await?;
        self.click(GITHUB_SIGN_IN_SELECTOR, DEFAULT_WAIT).await?;

        let deadline = Instant::now() + DEFAULT_WAIT;
        loop {
            let url = self.current_url().await;
            if url.contains("leetcode.com") && !url.contains("github.com") {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(JudgeError::Timeout {
                    what: format!("redirect back from GitHub (at {})", url),
                    after: DEFAULT_WAIT,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Block until the operator presses Enter in the terminal
    async fn manual_login_prompt(&self, context: &str) -> Result<(), JudgeError> {
        if self.headless {
            return Err(JudgeError::Login(format!(
                "{} needs manual intervention, which is impossible in headless mode",
                context
            )));
        }
        log_warning!(
            "Automatic {} did not complete. Finish it in the browser window, then press Enter here...",
            context
        );
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(())
    }

    async fn read_starting_code(&self) -> String {
        if self.wait_for(EDITOR_LINE_SELECTOR, DEFAULT_WAIT).await.is_err() {
            log_warning!("Editor did not load; starting code unavailable");
            return String::new();
        }

        match self.eval::<String>(READ_EDITOR_SCRIPT).await {
            Ok(code) if !code.trim().is_empty() => return code,
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "reading editor model failed, using rendered lines"),
        }

        let mut lines = Vec::new();
        if let Ok(elements) = self.page.find_elements(EDITOR_LINE_SELECTOR).await {
            for element in elements {
                if let Ok(Some(text)) = element.inner_text().await {
                    if !text.is_empty() {
                        lines.push(text);
                    }
                }
            }
        }
        lines.join("\n")
    }

    async fn select_language(&self, language: Language) -> Result<(), JudgeError> {
        let wanted = language.display_name();
        let button = self.wait_for(LANGUAGE_BUTTON_SELECTOR, DEFAULT_WAIT).await?;
        let current = button.inner_text().await?.unwrap_or_default();
        if current.trim() == wanted {
            return Ok(());
        }

        button.click().await?;
        tokio::time::sleep(Duration::from_secs(1)).await;

        let clicked: bool = self.eval(&select_language_script(wanted)).await?;
        if !clicked {
            return Err(JudgeError::Language(format!("{} option not found in dropdown", wanted)));
        }
        tokio::time::sleep(Duration::from_secs(1)).await;

        let button = self.wait_for(LANGUAGE_BUTTON_SELECTOR, SHORT_WAIT).await?;
        let now = button.inner_text().await?.unwrap_or_default();
        if now.trim() != wanted {
            return Err(JudgeError::Language(format!(
                "{} still selected after choosing {}",
                now.trim(),
                wanted
            )));
        }
        Ok(())
    }

    async fn set_editor_value(&self, code: &str) -> Result<(), JudgeError> {
        self.wait_for(EDITOR_SELECTOR, DEFAULT_WAIT).await?;
        let applied: bool = self.eval(&set_editor_script(code)).await?;
        if applied {
            Ok(())
        } else {
            Err(JudgeError::CodeInput("Monaco editor instance not found".to_string()))
        }
    }

    async fn mark_verdict(&self, script: &str) -> VerdictMark {
        VerdictMark {
            url: self.current_url().await,
            text: self.eval::<String>(script).await.unwrap_or_default(),
        }
    }

    /// Click a console button, remembering the banner it should replace
    async fn click_console(
        &mut self,
        what: &str,
        selector: &str,
        script: &str,
    ) -> Result<(), JudgeError> {
        let mark = self.mark_verdict(script).await;
        let this = &*self;
        with_retries(what, RETRY_ATTEMPTS, RETRY_DELAY, move || {
            this.click(selector, DEFAULT_WAIT)
        })
        .await?;
        self.pending = Some(mark);
        tokio::time::sleep(SHORT_WAIT).await;
        Ok(())
    }

    /// Poll `script` for a banner that differs from the pending mark.
    ///
    /// A banner identical to the one seen before the click is only
    /// accepted once it has been cleared, the page moved, or `DEFAULT_WAIT`
    /// passed without change.
    async fn wait_for_verdict_text(
        &mut self,
        script: &str,
        wait: Duration,
        what: &str,
    ) -> Result<String, JudgeError> {
        let mark = self.pending.take();
        let started = Instant::now();
        let deadline = started + wait;
        let mut cleared = false;
        loop {
            match self.eval::<String>(script).await {
                Ok(text) if text.trim().is_empty() => cleared = true,
                Ok(text) => {
                    let url = self.current_url().await;
                    if is_fresh_verdict(mark.as_ref(), &url, &text, cleared) {
                        return Ok(text);
                    }
                    if started.elapsed() >= DEFAULT_WAIT {
                        log_warning!("Result banner unchanged since the click, accepting '{}'", text.trim());
                        return Ok(text);
                    }
                }
                Err(e) => tracing::debug!(error = %e, "verdict poll failed"),
            }
            if Instant::now() >= deadline {
                let url = self.current_url().await;
                tracing::error!(url = %url, "no {} before timeout", what);
                return Err(JudgeError::Timeout {
                    what: what.to_string(),
                    after: wait,
                });
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    async fn read_result(
        &mut self,
        script: &str,
        wait: Duration,
        what: &str,
    ) -> Result<SubmissionResult, JudgeError> {
        let status_text = self.wait_for_verdict_text(script, wait, what).await?;

        let stats = self
            .eval::<SubmissionStats>(STATS_SCRIPT)
            .await
            .unwrap_or_default();
        let panel = self.eval::<ResultPanel>(PANEL_SCRIPT).await.unwrap_or_default();

        Ok(build_submission_result(
            &status_text,
            stats.runtime,
            stats.memory,
            panel,
        ))
    }
}

fn select_language_script(name: &str) -> String {
    let name = serde_json::Value::from(name);
    format!(
        r#"(() => {{
    const name = {name};
    const options = Array.from(document.querySelectorAll('div.text-text-primary, [role="option"], li'));
    const match = options.find(el => el.textContent.trim() === name);
    if (!match) return false;
    match.click();
    return true;
}})()"#
    )
}

fn set_editor_script(code: &str) -> String {
    // A JSON string literal is a valid JavaScript string literal.
    let code = serde_json::Value::from(code);
    format!(
        r#"(() => {{
    try {{
        const editor = monaco.editor.getEditors()[0];
        if (!editor) return false;
        editor.setValue({code});
        return true;
    }} catch (e) {{
        return false;
    }}
}})()"#
    )
}

#[async_trait]
impl JudgeSession for BrowserSession {
    async fn login(&mut self) -> Result<(), JudgeError> {
        if self.logged_in {
            return Ok(());
        }

        log_info!("Logging in to the judge...");
        self.navigate(LOGIN_URL).await?;
        if self.is_logged_in().await {
            self.logged_in = true;
            return Ok(());
        }

        if let Err(e) = self.github_login().await {
            tracing::warn!(error = %e, "automatic login failed");
        }

        if !self.is_logged_in().await {
            self.manual_login_prompt("login").await?;
            if !self.is_logged_in().await {
                return Err(JudgeError::Login(
                    "profile avatar not found after manual login".to_string(),
                ));
            }
        }

        log_info!("Login successful");
        self.logged_in = true;
        Ok(())
    }

    async fn get_problem_details(&mut self, url: &str) -> Result<ProblemDetails, JudgeError> {
        self.navigate(url).await?;

        let description = match self.wait_for(DESCRIPTION_SELECTOR, DEFAULT_WAIT).await {
            Ok(element) => element
                .inner_text()
                .await
                .ok()
                .flatten()
                .map(|text| normalize_blank_lines(&text))
                .unwrap_or_default(),
            Err(e) => {
                log_warning!("Problem description not found: {}", e);
                String::new()
            }
        };

        let starting_code = self.read_starting_code().await;

        let title = self
            .eval::<String>("document.title")
            .await
            .ok()
            .map(|t| t.trim_end_matches(" - LeetCode").trim().to_string())
            .filter(|t| !t.is_empty());

        if description.is_empty() && starting_code.is_empty() {
            return Err(JudgeError::ProblemUnavailable(url.to_string()));
        }

        Ok(ProblemDetails {
            title,
            description,
            starting_code,
        })
    }

    async fn ensure_language_is(&mut self, language: Language) -> Result<(), JudgeError> {
        let this = &*self;
        with_retries("select language", RETRY_ATTEMPTS, RETRY_DELAY, move || {
            this.select_language(language)
        })
        .await
    }

    async fn input_code(&mut self, code: &str) -> Result<(), JudgeError> {
        let this = &*self;
        with_retries("input code", RETRY_ATTEMPTS, RETRY_DELAY, move || {
            this.set_editor_value(code)
        })
        .await
    }

    async fn submit(&mut self) -> Result<(), JudgeError> {
        self.click_console("submit", SUBMIT_SELECTOR, VERDICT_SCRIPT)
            .await
            .map_err(|e| JudgeError::Submit(e.to_string()))
    }

    async fn get_submission_verdict(&mut self) -> Result<SubmissionResult, JudgeError> {
        log_info!("Waiting up to {}s for the verdict...", VERDICT_WAIT.as_secs());
        self.read_result(VERDICT_SCRIPT, VERDICT_WAIT, "submission verdict")
            .await
    }

    async fn run_example_tests(&mut self) -> Result<(), JudgeError> {
        log_info!("Running the code against the example tests...");
        self.click_console("run examples", RUN_SELECTOR, RUN_RESULT_SCRIPT)
            .await
            .map_err(|e| JudgeError::Submit(e.to_string()))
    }

    async fn get_run_results(&mut self) -> Result<SubmissionResult, JudgeError> {
        self.read_result(RUN_RESULT_SCRIPT, DEFAULT_WAIT * 2, "example run result")
            .await
    }

    async fn close(&mut self) -> Result<(), JudgeError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "browser close failed");
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!(error = %e, "waiting for browser exit failed");
        }
        self.handler.abort();
        tracing::info!("browser session closed");
        Ok(())
    }
}
