//! Stylesheet blocks appended by generic modifications

pub(crate) const DARK_THEME: &str = r#"/* Dark theme styles */
:root {
  --bg-color: #121212;
  --text-color: #e0e0e0;
  --primary-color: #90caf9;
  --secondary-color: #ce93d8;
  --surface-color: #1e1e1e;
  --error-color: #f44336;
  --border-color: #333333;
}

body {
  background-color: var(--bg-color);
  color: var(--text-color);
}

a {
  color: var(--primary-color);
}

button, .btn {
  background-color: var(--primary-color);
  color: #000000;
}

input, select, textarea {
  background-color: var(--surface-color);
  color: var(--text-color);
  border-color: var(--border-color);
}
"#;

pub(crate) const HIGH_CONTRAST: &str = r#"/* High contrast styles */
:root {
  --bg-color: #000000;
  --text-color: #ffffff;
  --primary-color: #ffff00;
  --secondary-color: #00ffff;
  --link-color: #3ff23f;
  --border-color: #ffffff;
}

body {
  background-color: var(--bg-color);
  color: var(--text-color);
}

a {
  color: var(--link-color);
  text-decoration: underline;
}

button, .btn {
  background-color: var(--primary-color);
  color: #000000;
  border: 2px solid #ffffff;
}

input, select, textarea {
  background-color: var(--bg-color);
  color: var(--text-color);
  border: 2px solid var(--border-color);
}

:focus {
  outline: 3px solid var(--primary-color);
}
"#;

pub(crate) const MOBILE_FIRST: &str = r#"/* Mobile-first styles */
:root {
  --container-padding: 1rem;
}

body {
  margin: 0;
  padding: 0;
}

.container {
  padding: var(--container-padding);
  max-width: 100%;
  width: 100%;
  box-sizing: border-box;
}

button, .btn, input, select, textarea {
  width: 100%;
  max-width: 100%;
  box-sizing: border-box;
}

@media (min-width: 768px) {
  .container {
    max-width: 720px;
    margin: 0 auto;
  }

  button, .btn {
    width: auto;
  }
}

@media (min-width: 992px) {
  .container {
    max-width: 960px;
  }
}

@media (min-width: 1200px) {
  .container {
    max-width: 1140px;
  }
}
"#;

pub(crate) const GENEROUS_SPACING: &str = r#"/* Generous spacing styles */
:root {
  --spacing-xs: 0.75rem;
  --spacing-sm: 1.25rem;
  --spacing-md: 2rem;
  --spacing-lg: 3rem;
  --spacing-xl: 4.5rem;
}

body {
  line-height: 1.8;
}

p {
  margin-bottom: var(--spacing-md);
}

h1, h2, h3, h4, h5, h6 {
  margin-top: var(--spacing-lg);
  margin-bottom: var(--spacing-md);
}

section {
  margin-bottom: var(--spacing-xl);
}

.container {
  padding: var(--spacing-md);
}

button, .btn {
  padding: var(--spacing-xs) var(--spacing-md);
  margin-right: var(--spacing-sm);
}

form > * {
  margin-bottom: var(--spacing-md);
}

.card {
  padding: var(--spacing-md);
  margin-bottom: var(--spacing-md);
}
"#;

pub(crate) const COMPACT_SPACING: &str = r#"/* Compact spacing styles */
:root {
  --spacing-xs: 0.25rem;
  --spacing-sm: 0.5rem;
  --spacing-md: 0.75rem;
  --spacing-lg: 1rem;
  --spacing-xl: 1.5rem;
}

body {
  line-height: 1.4;
}

p {
  margin-bottom: var(--spacing-sm);
}

h1, h2, h3, h4, h5, h6 {
  margin-top: var(--spacing-lg);
  margin-bottom: var(--spacing-sm);
}

section {
  margin-bottom: var(--spacing-lg);
}

.container {
  padding: var(--spacing-sm);
}

button, .btn {
  padding: var(--spacing-xs) var(--spacing-sm);
  margin-right: var(--spacing-xs);
}

form > * {
  margin-bottom: var(--spacing-sm);
}

.card {
  padding: var(--spacing-sm);
  margin-bottom: var(--spacing-sm);
}
"#;

pub(crate) const HIGH_DENSITY: &str = r#"/* High density content styles */
:root {
  --font-size-base: 0.875rem;
  --line-height-base: 1.4;
  --spacing-sm: 0.375rem;
  --spacing-md: 0.625rem;
}

body {
  font-size: var(--font-size-base);
  line-height: var(--line-height-base);
}

table {
  font-size: 0.8125rem;
}

th, td {
  padding: var(--spacing-sm);
}

.container {
  padding: var(--spacing-md);
}

.card {
  padding: var(--spacing-md);
  margin-bottom: var(--spacing-md);
}

button, .btn {
  padding: 0.25rem 0.5rem;
  font-size: 0.8125rem;
}
"#;

/// Append `block` to `style`, separated by a blank line
pub(crate) fn append(style: &str, block: &str) -> String {
    if style.trim().is_empty() {
        block.to_string()
    } else {
        format!("{}\n\n{}", style.trim_end(), block)
    }
}
